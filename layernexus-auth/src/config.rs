//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`AuthClient`](crate::AuthClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the LayerNEXUS API (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Refresh endpoint, called with the session cookie only.
    pub refresh_path: String,
    /// Login endpoint (form-encoded username/password).
    pub login_path: String,
    /// Current-user endpoint.
    pub me_path: String,
    /// Where the host should navigate after the session dies.
    pub login_redirect: String,
    /// Transport timeout in seconds. `None` leaves hung calls hanging.
    pub timeout_secs: Option<u64>,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            refresh_path: "/auth/refresh-token".to_string(),
            login_path: "/auth/login".to_string(),
            me_path: "/auth/me".to_string(),
            login_redirect: "/login".to_string(),
            timeout_secs: Some(60),
            user_agent: concat!("layernexus-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AuthConfig {
    /// Creates a config pointing at `base_url` with default paths.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Resolves a request path against the base URL. Absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
