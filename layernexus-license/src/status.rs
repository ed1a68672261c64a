//! License verification status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cached verification status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenseStatus {
    /// No check has ever run.
    #[default]
    Unchecked,
    /// Last remote check succeeded and asserted the license is active.
    Valid,
    /// Remote check failed but the offline grace period has not run out.
    Unknown,
    /// Remote check failed for longer than the offline grace period.
    ExpiredOffline,
    /// The license authority explicitly rejected the license.
    Invalid,
}

/// How a status indicator should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Ok,
    Warning,
    Degraded,
    Error,
    Neutral,
}

impl LicenseStatus {
    /// Returns true only for [`LicenseStatus::Valid`], the one state that
    /// unlocks gated functionality.
    #[must_use]
    pub fn is_entitled(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Short label for a status badge.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "Verified",
            Self::Unknown => "Offline (valid)",
            Self::ExpiredOffline => "Offline too long",
            Self::Invalid => "Invalid license",
            Self::Unchecked => "Not checked",
        }
    }

    /// Human-readable explanation for a tooltip.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Valid => "License is active and verified.",
            Self::Unknown => "License is valid but could not be reverified (offline).",
            Self::ExpiredOffline => "License has expired due to offline too long.",
            Self::Invalid => "License is invalid or rejected.",
            Self::Unchecked => "License has not been verified yet.",
        }
    }

    #[must_use]
    pub fn indicator(&self) -> Indicator {
        match self {
            Self::Valid => Indicator::Ok,
            Self::Unknown => Indicator::Warning,
            Self::ExpiredOffline => Indicator::Degraded,
            Self::Invalid => Indicator::Error,
            Self::Unchecked => Indicator::Neutral,
        }
    }

    /// Wire/storage name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Valid => "valid",
            Self::Unknown => "unknown",
            Self::ExpiredOffline => "expired-offline",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
