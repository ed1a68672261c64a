//! Bearer credential persistence.

use crate::error::AuthResult;
use layernexus_storage::KeyValueStore;
use std::fmt;
use std::sync::Arc;

/// Store key holding the bearer credential.
pub const CREDENTIAL_KEY: &str = "token";

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Reads and writes the credential under [`CREDENTIAL_KEY`].
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the current credential. Empty values count as absent.
    pub fn load(&self) -> AuthResult<Option<Credential>> {
        Ok(self
            .store
            .get(CREDENTIAL_KEY)?
            .filter(|token| !token.is_empty())
            .map(Credential))
    }

    /// Replaces the stored credential.
    pub fn save(&self, credential: &Credential) -> AuthResult<()> {
        self.store.set(CREDENTIAL_KEY, credential.as_str())?;
        Ok(())
    }

    /// Deletes the stored credential.
    pub fn clear(&self) -> AuthResult<()> {
        self.store.remove(CREDENTIAL_KEY)?;
        Ok(())
    }

    /// Returns true if a credential is stored.
    pub fn is_present(&self) -> AuthResult<bool> {
        Ok(self.load()?.is_some())
    }
}
