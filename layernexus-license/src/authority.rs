//! Remote license authority.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use layernexus_auth::{AuthClient, AuthResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Endpoint reporting the server's license validation.
pub const LICENSE_STATUS_PATH: &str = "/admin/license";

/// What the license authority asserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub valid: bool,
    pub license_id: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    /// Authority's explanation (e.g. "is valid", "is expired").
    pub detail: Option<String>,
    /// Authority's machine-readable code (e.g. `VALID`, `EXPIRED`).
    pub code: Option<String>,
}

/// Something that can verify the license remotely.
#[async_trait]
pub trait LicenseAuthority: Send + Sync {
    async fn verify(&self) -> AuthResult<Verification>;
}

#[derive(Debug, Deserialize)]
struct VerificationBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    license_id: Option<String>,
    #[serde(default)]
    expires: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl VerificationBody {
    fn into_verification(self) -> Verification {
        let expires = self.expires.as_deref().and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(parsed) => Some(parsed.with_timezone(&Utc)),
                Err(e) => {
                    warn!("Ignoring unparseable license expiry {raw:?}: {e}");
                    None
                }
            }
        });

        Verification {
            valid: self.status.as_deref() == Some("valid"),
            license_id: self.license_id,
            expires,
            detail: self.detail,
            code: self.code,
        }
    }
}

/// Verifies the license through the authenticated request pipeline.
pub struct RemoteLicenseAuthority {
    client: Arc<AuthClient>,
    path: String,
}

impl RemoteLicenseAuthority {
    pub fn new(client: Arc<AuthClient>) -> Self {
        Self {
            client,
            path: LICENSE_STATUS_PATH.to_string(),
        }
    }

    /// Overrides the verification endpoint.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

#[async_trait]
impl LicenseAuthority for RemoteLicenseAuthority {
    async fn verify(&self) -> AuthResult<Verification> {
        debug!("Verifying license with server");
        let body: VerificationBody = self.client.get_json(&self.path).await?;
        Ok(body.into_verification())
    }
}
