//! First-run license key setup.
//!
//! Both endpoints are public: they run before anyone can sign in.

use crate::error::{LicenseError, LicenseResult};
use layernexus_auth::{ApiRequest, AuthClient, AuthError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub const LICENSE_READY_PATH: &str = "/license/status";
pub const LICENSE_SETUP_PATH: &str = "/license/setup";

const ACTIVATION_FAILED: &str = "Activation failed. Please check your license key.";

/// Whether the server holds a usable license key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LicenseReadiness {
    pub ready: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub license_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetupResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the license setup endpoints.
pub struct LicenseSetup {
    client: Arc<AuthClient>,
}

impl LicenseSetup {
    pub fn new(client: Arc<AuthClient>) -> Self {
        Self { client }
    }

    /// Returns whether the server is ready; if not, the host should prompt
    /// for a license key.
    pub async fn readiness(&self) -> LicenseResult<LicenseReadiness> {
        let response = self
            .client
            .execute_anonymous(ApiRequest::get(LICENSE_READY_PATH))
            .await?;
        Ok(response.into_json()?)
    }

    /// Submits a license key for validation and storage on the server.
    pub async fn submit(&self, license_key: &str) -> LicenseResult<String> {
        let license_key = license_key.trim();
        if license_key.is_empty() {
            return Err(LicenseError::Setup("License key required".to_string()));
        }

        let request = ApiRequest::post(LICENSE_SETUP_PATH)
            .json(&serde_json::json!({ "license_key": license_key }))?;

        match self.client.execute_anonymous(request).await {
            Ok(response) => {
                let body: SetupResponse = response.into_json()?;
                info!("License key saved on server");
                Ok(body
                    .message
                    .unwrap_or_else(|| "License key saved".to_string()))
            }
            Err(err @ AuthError::Server { .. }) => Err(LicenseError::Setup(
                err.server_detail()
                    .unwrap_or_else(|| ACTIVATION_FAILED.to_string()),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
