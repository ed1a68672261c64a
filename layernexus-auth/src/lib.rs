//! Authenticated request pipeline for the LayerNEXUS client.
//!
//! [`AuthClient::execute`] attaches the stored bearer credential to every
//! call. When the server answers 401 the client refreshes the credential once
//! through the session cookie and retries the original request once:
//!
//! - refresh succeeds: new credential persisted, retry result returned as-is
//! - refresh fails: credential cleared, [`SessionEvent::Expired`] fired once,
//!   [`AuthError::Unauthenticated`] returned
//! - no response at all: [`AuthError::Network`], credential untouched
//!
//! Concurrent 401s share one refresh.

mod account;
mod client;
mod config;
mod cookies;
mod credential;
mod error;
mod request;
mod response;
mod session;

pub use account::User;
pub use client::AuthClient;
pub use config::AuthConfig;
pub use cookies::COOKIE_JAR_KEY;
pub use credential::{Credential, CredentialStore, CREDENTIAL_KEY};
pub use error::{AuthError, AuthResult};
pub use request::{ApiRequest, FormPart, MultipartForm, RequestBody};
pub use response::{ApiResponse, ResponseBody};
pub use session::{NoopSessionHandler, SessionEvent, SessionHandler};

pub use reqwest::Method;
