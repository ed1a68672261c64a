//! The authenticated request pipeline.
//!
//! Every call gets the stored bearer credential attached. A 401 triggers one
//! refresh through the session cookie and one retry; everything else is
//! decoded and returned as-is.

use crate::config::AuthConfig;
use crate::cookies::PersistentCookieJar;
use crate::credential::{Credential, CredentialStore};
use crate::error::{AuthError, AuthResult};
use crate::request::ApiRequest;
use crate::response::{decode, ApiResponse};
use crate::session::{NoopSessionHandler, SessionEvent, SessionHandler, SessionLatch};
use layernexus_storage::KeyValueStore;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
}

/// Result of one refresh, shared with every request that raced it.
#[derive(Debug, Clone)]
enum RefreshOutcome {
    Renewed(Credential),
    Failed,
}

#[derive(Debug, Default)]
struct RefreshSlot {
    last: Option<RefreshOutcome>,
}

/// HTTP client that owns the bearer credential lifecycle.
pub struct AuthClient {
    pub(crate) config: AuthConfig,
    pub(crate) http: Client,
    pub(crate) credentials: CredentialStore,
    pub(crate) cookies: Arc<PersistentCookieJar>,
    handler: Arc<dyn SessionHandler>,
    refresh: Mutex<RefreshSlot>,
    /// Bumped after every completed refresh, successful or not.
    refresh_generation: AtomicU64,
    pub(crate) session: SessionLatch,
}

impl AuthClient {
    /// Creates a client that keeps its credential and session cookies in `store`.
    pub fn new(config: AuthConfig, store: Arc<dyn KeyValueStore>) -> AuthResult<Self> {
        let cookies = Arc::new(PersistentCookieJar::load(Arc::clone(&store)));
        let mut builder = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AuthError::InvalidRequest(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            credentials: CredentialStore::new(store),
            cookies,
            handler: Arc::new(NoopSessionHandler),
            refresh: Mutex::new(RefreshSlot::default()),
            refresh_generation: AtomicU64::new(0),
            session: SessionLatch::new(),
        })
    }

    /// Routes session events to `handler`.
    pub fn with_session_handler(mut self, handler: Arc<dyn SessionHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Returns true if a credential is stored.
    pub fn has_credential(&self) -> AuthResult<bool> {
        self.credentials.is_present()
    }

    /// Executes `request` with the stored credential, refreshing once on 401.
    pub async fn execute(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        let url = self.config.url_for(&request.path);
        let observed = self.refresh_generation.load(Ordering::Acquire);
        let credential = self.credentials.load()?;

        debug!(method = %request.method, url = %url, "Sending request");
        let response = self.send(&request, &url, credential.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        debug!(url = %url, "Credential rejected, refreshing");
        let renewed = self.refresh_once(observed, credential.as_ref()).await?;

        debug!(url = %url, "Retrying with refreshed credential");
        let retry = self.send(&request, &url, Some(&renewed)).await?;
        decode(retry).await
    }

    /// Executes `request` without a credential and without refresh.
    pub async fn execute_anonymous(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        let url = self.config.url_for(&request.path);
        debug!(method = %request.method, url = %url, "Sending anonymous request");
        let response = self.send(&request, &url, None).await?;
        decode(response).await
    }

    /// `GET path` decoded into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AuthResult<T> {
        self.execute(ApiRequest::get(path)).await?.into_json()
    }

    async fn send(
        &self,
        request: &ApiRequest,
        url: &str,
        credential: Option<&Credential>,
    ) -> AuthResult<reqwest::Response> {
        let builder = request.build(&self.http, url, credential)?;
        builder.send().await.map_err(AuthError::from)
    }

    /// Refreshes the credential, or reuses a refresh that completed after
    /// `observed` was read. A renewed credential equal to `rejected` was
    /// already refused by the server and is never reused.
    pub(crate) async fn refresh_once(
        &self,
        observed: u64,
        rejected: Option<&Credential>,
    ) -> AuthResult<Credential> {
        let mut slot = self.refresh.lock().await;

        let shared = if self.refresh_generation.load(Ordering::Acquire) != observed {
            match &slot.last {
                Some(RefreshOutcome::Renewed(renewed)) if Some(renewed) == rejected => None,
                last => last.clone(),
            }
        } else {
            None
        };

        let outcome = match shared {
            Some(outcome) => {
                debug!("Reusing refresh completed by a concurrent request");
                outcome
            }
            None => {
                let outcome = self.run_refresh().await?;
                slot.last = Some(outcome.clone());
                self.refresh_generation.fetch_add(1, Ordering::AcqRel);
                outcome
            }
        };
        drop(slot);

        match outcome {
            RefreshOutcome::Renewed(credential) => Ok(credential),
            RefreshOutcome::Failed => Err(AuthError::Unauthenticated),
        }
    }

    async fn run_refresh(&self) -> AuthResult<RefreshOutcome> {
        let url = self.config.url_for(&self.config.refresh_path);

        let response = match self.http.post(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Token refresh failed: {e}");
                self.expire_session()?;
                return Ok(RefreshOutcome::Failed);
            }
        };

        if !response.status().is_success() {
            warn!("Token refresh rejected with status {}", response.status());
            self.expire_session()?;
            return Ok(RefreshOutcome::Failed);
        }

        let token: TokenResponse = match response.json().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to parse token refresh response: {e}");
                self.expire_session()?;
                return Ok(RefreshOutcome::Failed);
            }
        };

        let credential = Credential::new(token.access_token);
        self.credentials.save(&credential)?;
        self.session.arm();
        info!("Access token refreshed");
        self.handler.handle(&SessionEvent::Refreshed);

        Ok(RefreshOutcome::Renewed(credential))
    }

    /// Clears the credential and session cookies, then fires the expiry
    /// event once per session.
    pub(crate) fn expire_session(&self) -> AuthResult<()> {
        self.credentials.clear()?;
        self.cookies.clear()?;
        if self.session.trip() {
            info!("Session expired, sign-in required");
            self.handler.handle(&SessionEvent::Expired {
                login_path: self.config.login_redirect.clone(),
            });
        }
        Ok(())
    }
}
