//! Shared test helpers for license tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use layernexus_auth::{AuthClient, AuthConfig, AuthError, AuthResult, CREDENTIAL_KEY};
use layernexus_license::{
    LicenseAuthority, LicenseManager, LicensePolicy, ManualClock, Verification,
};
use layernexus_storage::{KeyValueStore, MemoryStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Fixed starting point for every scenario.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

pub fn at_hours(hours: i64) -> DateTime<Utc> {
    t0() + Duration::hours(hours)
}

/// What the fake authority answers next.
#[derive(Debug, Clone)]
pub enum Reply {
    Valid,
    Invalid,
    Network,
    Unauthenticated,
    ServerError(u16),
}

/// A scripted [`LicenseAuthority`] that counts calls.
pub struct FakeAuthority {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
    delay: Option<std::time::Duration>,
}

impl FakeAuthority {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
            delay: None,
        })
    }

    pub fn slow(reply: Reply, delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn license_expiry() -> DateTime<Utc> {
    t0() + Duration::days(30)
}

#[async_trait]
impl LicenseAuthority for FakeAuthority {
    async fn verify(&self) -> AuthResult<Verification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Valid => Ok(Verification {
                valid: true,
                license_id: Some("lic-123".to_string()),
                expires: Some(license_expiry()),
                detail: Some("is valid".to_string()),
                code: Some("VALID".to_string()),
            }),
            Reply::Invalid => Ok(Verification {
                valid: false,
                license_id: Some("lic-123".to_string()),
                expires: None,
                detail: Some("is suspended".to_string()),
                code: Some("SUSPENDED".to_string()),
            }),
            Reply::Network => Err(AuthError::Network("connection refused".to_string())),
            Reply::Unauthenticated => Err(AuthError::Unauthenticated),
            Reply::ServerError(status) => Err(AuthError::Server {
                status,
                body: String::new(),
            }),
        }
    }
}

/// A memory store holding a credential.
pub fn signed_in_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(CREDENTIAL_KEY, "tok").unwrap();
    store
}

/// A pipeline client pointed at `server`, sharing `store`.
pub fn client_for(server: &MockServer, store: Arc<MemoryStore>) -> Arc<AuthClient> {
    let store: Arc<dyn KeyValueStore> = store;
    Arc::new(AuthClient::new(AuthConfig::with_base_url(server.uri()), store).unwrap())
}

/// Everything a scenario needs.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub authority: Arc<FakeAuthority>,
    pub clock: Arc<ManualClock>,
    pub manager: Arc<LicenseManager>,
}

impl Harness {
    pub fn new(reply: Reply) -> Self {
        Self::with_store(signed_in_store(), FakeAuthority::new(reply))
    }

    pub fn with_store(store: Arc<MemoryStore>, authority: Arc<FakeAuthority>) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let manager = Arc::new(
            LicenseManager::new(
                store.clone(),
                authority.clone(),
                clock.clone(),
                LicensePolicy::default(),
            )
            .unwrap(),
        );
        Self {
            store,
            authority,
            clock,
            manager,
        }
    }

    /// Moves the clock to `hours` after t0 and runs a check.
    pub async fn check_at(&self, hours: i64) -> layernexus_license::CheckOutcome {
        self.clock.set(at_hours(hours));
        self.manager.ensure_fresh().await.unwrap()
    }
}
