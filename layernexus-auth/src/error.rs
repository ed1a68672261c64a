//! Error types for the request pipeline.

use layernexus_storage::StorageError;
use thiserror::Error;

/// Result type for authenticated requests.
pub type AuthResult<T> = Result<T, AuthError>;

/// Typed outcome of a failed request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credential rejected and the refresh failed or was not possible.
    /// The stored credential has already been cleared.
    #[error("session expired, sign in again")]
    Unauthenticated,

    /// No response was obtained from the server.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The response declared JSON but the body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Login was rejected.
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// Credential storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Returns true if no response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, AuthError::Network(_))
    }

    /// Returns the HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Server { status, .. } => Some(*status),
            AuthError::Unauthenticated => Some(401),
            _ => None,
        }
    }

    /// Returns the `detail` message of a JSON error body, if the server sent one.
    pub fn server_detail(&self) -> Option<String> {
        let AuthError::Server { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            AuthError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            AuthError::Decode(err.to_string())
        } else {
            AuthError::Network(err.to_string())
        }
    }
}
