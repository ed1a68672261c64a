//! Session cookie jar that survives restarts.
//!
//! The refresh endpoint authenticates with a cookie set at login. The jar is
//! written back to the key-value store whenever the server sets a cookie, so
//! a restarted client can still refresh the stored bearer credential.

use crate::error::AuthResult;
use layernexus_storage::{KeyValueStore, StorageError};
use reqwest::Url;
use reqwest::cookie::CookieStore as HttpCookieStore;
use reqwest::header::HeaderValue;
use reqwest_cookie_store::{CookieStore, CookieStoreMutex};
use std::sync::Arc;
use tracing::{debug, warn};

/// Store key holding the serialized cookie jar.
pub const COOKIE_JAR_KEY: &str = "session-cookies";

pub(crate) struct PersistentCookieJar {
    cookies: CookieStoreMutex,
    store: Arc<dyn KeyValueStore>,
}

impl PersistentCookieJar {
    /// Restores the jar from `store`. An unreadable jar starts empty.
    pub(crate) fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let cookies = match store.get(COOKIE_JAR_KEY) {
            Ok(Some(raw)) => cookie_store::serde::json::load(raw.as_bytes()).unwrap_or_else(|e| {
                warn!("Discarding unreadable cookie jar: {e}");
                CookieStore::default()
            }),
            Ok(None) => CookieStore::default(),
            Err(e) => {
                warn!("Failed to read cookie jar: {e}");
                CookieStore::default()
            }
        };
        Self {
            cookies: CookieStoreMutex::new(cookies),
            store,
        }
    }

    /// Writes every cookie, including session cookies, back to the store.
    /// Expired cookies are dropped again on the next load.
    pub(crate) fn persist(&self) -> AuthResult<()> {
        let mut buf = Vec::new();
        {
            let cookies = self
                .cookies
                .lock()
                .map_err(|_| StorageError::Backend("cookie jar lock poisoned".to_string()))?;
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&cookies, &mut buf)
                .map_err(|e| StorageError::Backend(format!("failed to encode cookie jar: {e}")))?;
        }
        let raw = String::from_utf8(buf)
            .map_err(|e| StorageError::Backend(format!("cookie jar is not UTF-8: {e}")))?;
        self.store.set(COOKIE_JAR_KEY, &raw)?;
        Ok(())
    }

    /// Forgets every cookie, in memory and in the store.
    pub(crate) fn clear(&self) -> AuthResult<()> {
        if let Ok(mut cookies) = self.cookies.lock() {
            cookies.clear();
        }
        self.store.remove(COOKIE_JAR_KEY)?;
        Ok(())
    }
}

impl HttpCookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.cookies.set_cookies(cookie_headers, url);
        match self.persist() {
            Ok(()) => debug!("Session cookies saved"),
            Err(e) => warn!("Failed to save session cookies: {e}"),
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.cookies.cookies(url)
    }
}
