//! Login, logout and current-user lookups.

use crate::client::{AuthClient, TokenResponse};
use crate::credential::Credential;
use crate::error::{AuthError, AuthResult};
use crate::request::ApiRequest;
use crate::response::decode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const LOGIN_FAILED: &str = "Login failed";

/// The signed-in user as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

impl AuthClient {
    /// Signs in with a username and password.
    ///
    /// The credential is stored only after the user lookup succeeds. The
    /// server's refresh cookie is kept in the client's cookie jar.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<User> {
        let url = self.config.url_for(&self.config.login_path);
        debug!(username = %username, "Signing in");

        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let token: TokenResponse = decode(response)
            .await
            .map_err(login_failure)?
            .into_json()?;
        let credential = Credential::new(token.access_token);

        let me = self
            .http
            .get(self.config.url_for(&self.config.me_path))
            .bearer_auth(credential.as_str())
            .send()
            .await?;
        let user: User = decode(me).await.map_err(login_failure)?.into_json()?;

        self.credentials.save(&credential)?;
        self.session.arm();
        info!(username = %user.username, "Signed in");
        Ok(user)
    }

    /// Forgets the stored credential and session cookies.
    pub fn logout(&self) -> AuthResult<()> {
        self.credentials.clear()?;
        self.cookies.clear()?;
        info!("Signed out");
        Ok(())
    }

    /// Looks up the current user through the pipeline.
    pub async fn current_user(&self) -> AuthResult<User> {
        let path = self.config.me_path.clone();
        self.execute(ApiRequest::get(path)).await?.into_json()
    }
}

fn login_failure(err: AuthError) -> AuthError {
    if matches!(err, AuthError::Server { .. }) {
        let detail = err.server_detail().unwrap_or_else(|| LOGIN_FAILED.to_string());
        return AuthError::LoginFailed(detail);
    }
    err
}
