//! Feature gating on license and assistant-key state.

use crate::manager::LicenseManager;
use crate::status::LicenseStatus;
use layernexus_auth::AuthClient;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Endpoint reporting whether an OpenAI key is configured.
pub const ASSISTANT_KEY_PATH: &str = "/admin/openai-key";

pub const LICENSE_INACTIVE_REASON: &str = "AI is disabled due to inactive or offline license.";
pub const ASSISTANT_KEY_MISSING_REASON: &str =
    "OpenAI key is missing or invalid. Please contact admin.";

/// Paid features behind the license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// LLM-assisted schema cleanup.
    AiCleanup,
}

/// Whether the server has an assistant (OpenAI) key configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssistantKeyStatus {
    /// Not probed yet.
    #[default]
    Checking,
    Available,
    Missing,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub allowed: bool,
    /// Why the feature is disabled, for the disabled affordance.
    pub reason: Option<&'static str>,
}

impl GateDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: &'static str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Decides whether `feature` is usable. Only a `valid` license unlocks it.
#[must_use]
pub fn evaluate(
    feature: Feature,
    license: LicenseStatus,
    assistant: AssistantKeyStatus,
) -> GateDecision {
    match feature {
        Feature::AiCleanup => {
            if !license.is_entitled() {
                GateDecision::deny(LICENSE_INACTIVE_REASON)
            } else if assistant != AssistantKeyStatus::Available {
                GateDecision::deny(ASSISTANT_KEY_MISSING_REASON)
            } else {
                GateDecision::allow()
            }
        }
    }
}

/// Asks the server whether an assistant key is configured. Any failure
/// counts as missing.
pub async fn probe_assistant_key(client: &AuthClient) -> AssistantKeyStatus {
    match client.get_json::<Value>(ASSISTANT_KEY_PATH).await {
        Ok(body) if is_truthy(body.get("openai_api_key")) => AssistantKeyStatus::Available,
        Ok(_) => AssistantKeyStatus::Missing,
        Err(e) => {
            debug!("Assistant key probe failed: {e}");
            AssistantKeyStatus::Missing
        }
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Combines the license manager with a cached assistant-key probe.
pub struct FeatureGate {
    manager: Arc<LicenseManager>,
    client: Arc<AuthClient>,
    assistant: RwLock<AssistantKeyStatus>,
}

impl FeatureGate {
    pub fn new(manager: Arc<LicenseManager>, client: Arc<AuthClient>) -> Self {
        Self {
            manager,
            client,
            assistant: RwLock::new(AssistantKeyStatus::Checking),
        }
    }

    /// Re-probes the assistant key and caches the answer.
    pub async fn refresh_assistant_key(&self) -> AssistantKeyStatus {
        let status = probe_assistant_key(&self.client).await;
        if let Ok(mut cached) = self.assistant.write() {
            *cached = status;
        }
        status
    }

    /// Cached assistant-key status.
    pub fn assistant_key(&self) -> AssistantKeyStatus {
        self.assistant
            .read()
            .map(|s| *s)
            .unwrap_or(AssistantKeyStatus::Checking)
    }

    /// Evaluates `feature` from cached state only.
    pub fn decision(&self, feature: Feature) -> GateDecision {
        evaluate(feature, self.manager.status(), self.assistant_key())
    }
}
