//! License verification for the LayerNEXUS client.
//!
//! This module handles:
//! - A cached verification status with a freshness window (TTL)
//! - Re-verification against the server through the authenticated pipeline
//! - Graceful degradation when the server is unreachable (GRACE)
//! - Persistence of the status across restarts
//! - Gating paid features on the cached status
//!
//! # States
//!
//! | status | meaning |
//! |---|---|
//! | `unchecked` | no check has run yet |
//! | `valid` | server asserted the license is active |
//! | `unknown` | offline, still inside the grace window |
//! | `expired-offline` | offline longer than the grace window |
//! | `invalid` | server asserted the license is not valid |
//!
//! # Design Principles
//!
//! - **Non-blocking reads**: status is read from cache, never awaited
//! - **Bounded traffic**: at most one verification per TTL while valid
//! - **No permanent bypass**: offline use ends after GRACE
//! - **Explicit rejection wins**: `invalid` is not undone by going offline

mod authority;
mod clock;
mod error;
pub mod gate;
mod manager;
mod policy;
mod record;
pub mod setup;
mod status;

pub use authority::{LicenseAuthority, RemoteLicenseAuthority, Verification, LICENSE_STATUS_PATH};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LicenseError, LicenseResult};
pub use gate::{evaluate, AssistantKeyStatus, Feature, FeatureGate, GateDecision};
pub use manager::{CheckKind, CheckOutcome, LicenseManager};
pub use policy::{LicensePolicy, LICENSE_TTL_SECS, OFFLINE_GRACE_SECS};
pub use record::{LicenseRecord, LICENSE_RECORD_KEY};
pub use setup::{LicenseReadiness, LicenseSetup};
pub use status::{Indicator, LicenseStatus};
