//! The persisted license record and its transitions.
//!
//! Transitions are pure functions of `(record, outcome, now, policy)`; the
//! manager only decides when to call them and persists the result.

use crate::authority::Verification;
use crate::policy::LicensePolicy;
use crate::status::LicenseStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Store key holding the serialized [`LicenseRecord`].
pub const LICENSE_RECORD_KEY: &str = "license-check-store";

/// Cached verification state, persisted as one JSON entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    #[serde(default)]
    pub status: LicenseStatus,
    /// Last attempted verification, successful or not. Never moves backwards.
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    /// Last successful verification. Offline grace is measured from here.
    #[serde(default)]
    pub last_verified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub license_id: Option<String>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// Returns true if a cached `valid` status is still inside the TTL.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, policy: &LicensePolicy) -> bool {
        self.status == LicenseStatus::Valid
            && self
                .last_checked
                .is_some_and(|checked| now - checked < policy.ttl())
    }

    /// Time since the grace anchor (last verification, else last attempt).
    #[must_use]
    pub fn offline_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_verified
            .or(self.last_checked)
            .map(|anchor| now - anchor)
    }

    /// Applies a successful verification.
    pub fn apply_verification(&mut self, verification: &Verification, now: DateTime<Utc>) {
        self.status = if verification.valid {
            LicenseStatus::Valid
        } else {
            LicenseStatus::Invalid
        };
        self.checkpoint(now);
        self.last_verified = self.last_checked;
        self.license_id = verification.license_id.clone();
        self.expires = verification.expires;
    }

    /// Applies a failed verification attempt.
    ///
    /// An explicit `invalid` is only cleared by a new successful check.
    /// `license_id` and `expires` are left as they were.
    pub fn apply_failure(&mut self, now: DateTime<Utc>, policy: &LicensePolicy) {
        if self.status != LicenseStatus::Invalid {
            self.status = match self.offline_for(now) {
                Some(elapsed) if elapsed > policy.grace() => LicenseStatus::ExpiredOffline,
                _ => LicenseStatus::Unknown,
            };
        }
        self.checkpoint(now);
    }

    fn checkpoint(&mut self, now: DateTime<Utc>) {
        self.last_checked = Some(match self.last_checked {
            Some(previous) if previous > now => previous,
            _ => now,
        });
    }
}
