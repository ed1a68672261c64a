//! Error types for the licensing module.

use layernexus_auth::AuthError;
use layernexus_storage::StorageError;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// TTL/GRACE combination that would make the state machine degenerate.
    #[error("invalid license policy: {0}")]
    InvalidPolicy(String),

    /// License key setup was rejected.
    #[error("license setup failed: {0}")]
    Setup(String),

    /// Request pipeline failure that was not absorbed.
    #[error("request failed: {0}")]
    Auth(#[from] AuthError),

    /// Persisted state could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
