//! Freshness and offline-tolerance windows.

use crate::error::{LicenseError, LicenseResult};
use chrono::{Duration, TimeDelta};
use serde::{Deserialize, Serialize};

/// A cached `valid` status is trusted without a network call for this long (24 hours).
pub const LICENSE_TTL_SECS: i64 = 24 * 60 * 60;

/// Maximum offline duration before entitlement is revoked (3 days).
pub const OFFLINE_GRACE_SECS: i64 = 3 * 24 * 60 * 60;

/// TTL/GRACE pair driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePolicy {
    /// Freshness window in seconds.
    pub ttl_secs: i64,
    /// Offline grace window in seconds. Must exceed `ttl_secs`.
    pub grace_secs: i64,
}

impl Default for LicensePolicy {
    fn default() -> Self {
        Self {
            ttl_secs: LICENSE_TTL_SECS,
            grace_secs: OFFLINE_GRACE_SECS,
        }
    }
}

impl LicensePolicy {
    /// Creates a validated policy.
    pub fn new(ttl_secs: i64, grace_secs: i64) -> LicenseResult<Self> {
        let policy = Self {
            ttl_secs,
            grace_secs,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Rejects windows that would make the state machine degenerate or that
    /// do not fit in a [`Duration`].
    pub fn validate(&self) -> LicenseResult<()> {
        for (name, secs) in [("ttl", self.ttl_secs), ("grace", self.grace_secs)] {
            if Duration::try_seconds(secs).is_none() {
                return Err(LicenseError::InvalidPolicy(format!(
                    "{name} of {secs}s is out of range"
                )));
            }
        }
        if self.ttl_secs <= 0 {
            return Err(LicenseError::InvalidPolicy(format!(
                "ttl must be positive, got {}s",
                self.ttl_secs
            )));
        }
        if self.grace_secs <= self.ttl_secs {
            return Err(LicenseError::InvalidPolicy(format!(
                "grace ({}s) must exceed ttl ({}s)",
                self.grace_secs, self.ttl_secs
            )));
        }
        Ok(())
    }

    /// Freshness window. Saturates for out-of-range values.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::try_seconds(self.ttl_secs).unwrap_or(TimeDelta::MAX)
    }

    /// Offline grace window. Saturates for out-of-range values.
    #[must_use]
    pub fn grace(&self) -> Duration {
        Duration::try_seconds(self.grace_secs).unwrap_or(TimeDelta::MAX)
    }
}
