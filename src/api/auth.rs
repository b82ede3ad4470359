use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::client::{decode, rejection, ApiClient, ApiError, Result};
use super::retry::with_backoff;
use super::types::SessionInfo;

/// Whether a backend session is active, and for whom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub authenticated: bool,
    pub identity: Option<String>,
}

impl AuthState {
    pub fn signed_in(identity: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            identity: Some(identity.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

/// Third-party sign-in entry points served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    fn path(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google_login",
            OAuthProvider::Github => "github_login",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OAuthProvider::Google => "Google",
            OAuthProvider::Github => "GitHub",
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct PasswordChange<'a> {
    current_password: &'a str,
    new_password: &'a str,
    confirm_password: &'a str,
}

#[derive(Serialize)]
struct PasswordReset<'a> {
    email: &'a str,
    new_password: &'a str,
}

/// Message of a successful reply, or `fallback`.
fn message_or(value: &Value, fallback: &str) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

impl ApiClient {
    /// Ask the backend who the session cookie belongs to.
    ///
    /// A 401 or a reply without `username` means signed out.
    pub async fn check_session(&self) -> Result<AuthState> {
        match self.get(&["session_test"]).await {
            Ok(Value::Null) => Ok(AuthState::signed_out()),
            Ok(value) => {
                let info: SessionInfo = decode(value)?;
                Ok(match info.username.filter(|u| !u.is_empty()) {
                    Some(name) => AuthState::signed_in(name),
                    None => AuthState::signed_out(),
                })
            }
            Err(ApiError::Unauthorized) => Ok(AuthState::signed_out()),
            Err(e) => Err(e),
        }
    }

    /// Sign in with email and password. Transport failures are retried with backoff.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<AuthState> {
        let body = Credentials {
            username,
            password: password.expose_secret(),
        };
        let reply = with_backoff(self.backoff, || self.post(&["login"], &body)).await?;
        if let Some(err) = rejection(&reply, "Login failed.") {
            return Err(err);
        }
        if reply.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(ApiError::Rejected(message_or(&reply, "Login failed.")));
        }
        tracing::info!(user = %username, "Signed in");
        Ok(AuthState::signed_in(username))
    }

    pub async fn logout(&self) -> Result<()> {
        self.post(&["logout"], &serde_json::json!({})).await?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Create an account. Retried like [`ApiClient::login`].
    pub async fn register(&self, username: &str, password: &SecretString) -> Result<String> {
        let body = Credentials {
            username,
            password: password.expose_secret(),
        };
        let reply = with_backoff(self.backoff, || self.post(&["register"], &body)).await?;
        if let Some(err) = rejection(&reply, "Registration failed.") {
            return Err(err);
        }
        Ok(message_or(&reply, "Account created."))
    }

    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<String> {
        let body = PasswordChange {
            current_password: current.expose_secret(),
            new_password: new.expose_secret(),
            confirm_password: confirm.expose_secret(),
        };
        let reply = self.post(&["change-password"], &body).await?;
        if let Some(err) = rejection(&reply, "Password change failed.") {
            return Err(err);
        }
        Ok(message_or(&reply, "Password changed."))
    }

    pub async fn reset_password(&self, email: &str, new_password: &SecretString) -> Result<String> {
        let body = PasswordReset {
            email,
            new_password: new_password.expose_secret(),
        };
        let reply = self.post(&["reset-password"], &body).await?;
        if let Some(err) = rejection(&reply, "Password reset failed.") {
            return Err(err);
        }
        Ok(message_or(&reply, "Password reset."))
    }

    /// Raw reply of `GET /check-oauth-user`.
    pub async fn check_oauth_user(&self) -> Result<Value> {
        self.get(&["check-oauth-user"]).await
    }

    /// Browser URL that starts a sign-in with `provider`.
    pub fn oauth_login_url(&self, provider: OAuthProvider) -> Result<Url> {
        self.origin_url(&[provider.path(), "login"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_oauth_urls() {
        let c = ApiClient::new("http://127.0.0.1:5000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            c.oauth_login_url(OAuthProvider::Google).unwrap().as_str(),
            "http://127.0.0.1:5000/google_login/login"
        );
        assert_eq!(
            c.oauth_login_url(OAuthProvider::Github).unwrap().as_str(),
            "http://127.0.0.1:5000/github_login/login"
        );
    }

    #[test]
    fn test_credentials_payload_shape() {
        let secret = SecretString::from("hunter2");
        let body = Credentials {
            username: "a@b.c",
            password: secret.expose_secret(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"username": "a@b.c", "password": "hunter2"})
        );
    }
}
