//! Shared helpers for pipeline tests.

#![allow(dead_code)]

use layernexus_auth::{AuthClient, AuthConfig, SessionEvent, SessionHandler, CREDENTIAL_KEY};
use layernexus_storage::{KeyValueStore, MemoryStore};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// A memory store pre-seeded with a credential.
pub fn store_with_token(token: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(CREDENTIAL_KEY, token).unwrap();
    store
}

pub fn stored_token(store: &MemoryStore) -> Option<String> {
    store.get(CREDENTIAL_KEY).unwrap()
}

pub fn client_for(server: &MockServer, store: Arc<MemoryStore>) -> AuthClient {
    let store: Arc<dyn KeyValueStore> = store;
    AuthClient::new(AuthConfig::with_base_url(server.uri()), store).unwrap()
}

/// Collects every session event the client emits.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn handler(&self) -> Arc<dyn SessionHandler> {
        let events = self.events.clone();
        Arc::new(move |event: &SessionEvent| events.lock().unwrap().push(event.clone()))
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn expired_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::Expired { .. }))
            .count()
    }
}
