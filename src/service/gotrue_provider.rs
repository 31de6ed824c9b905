use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::service::auth_service::{AuthError, AuthProvider, AuthUser, Session};

/// Password auth against the platform's GoTrue endpoints (`/auth/v1`).
pub struct GoTrueAuthProvider {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
    sessions: watch::Sender<Option<Session>>,
}

#[derive(Deserialize)]
struct WireUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct WireSession {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: WireUser,
}

impl WireSession {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| chrono::Utc::now().timestamp() + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: AuthUser { id: self.user.id, email: self.user.email.unwrap_or_default() },
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Best human-readable message from a GoTrue error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

impl GoTrueAuthProvider {
    pub fn new(config: &BackendConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Network(format!("Failed to build HTTP client: {}", e)))?;
        let (sessions, _) = watch::channel(None);
        Ok(Self { http, auth_url: config.auth_url(), anon_key: config.anon_key.clone(), sessions })
    }

    async fn post(&self, path: &str, bearer: Option<&str>, body: &impl Serialize) -> Result<(u16, String), AuthError> {
        let mut request = self
            .http
            .post(format!("{}{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| AuthError::Network(e.to_string()))?;
        Ok((status, text))
    }
}

#[async_trait]
impl AuthProvider for GoTrueAuthProvider {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let (status, body) = self.post("/token?grant_type=password", None, &Credentials { email, password }).await?;
        match status {
            200 => {
                let wire: WireSession = serde_json::from_str(&body)
                    .map_err(|e| AuthError::Provider(format!("Unexpected sign-in response: {}", e)))?;
                let session = wire.into_session();
                info!(user_id = %session.user.id, "Password sign-in accepted");
                self.sessions.send_replace(Some(session.clone()));
                Ok(session)
            }
            400 | 401 => {
                debug!("Sign-in rejected: {}", error_message(&body));
                Err(AuthError::InvalidCredentials)
            }
            _ => {
                error!(status, "Sign-in request failed");
                Err(AuthError::Provider(error_message(&body)))
            }
        }
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> Result<Option<Session>, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });
        let (status, text) = self.post("/signup", None, &body).await?;
        if !(200..300).contains(&status) {
            error!(status, "Sign-up request failed");
            return Err(AuthError::Provider(error_message(&text)));
        }
        // Without email confirmation the response is a session; otherwise just the user.
        match serde_json::from_str::<WireSession>(&text) {
            Ok(wire) => {
                let session = wire.into_session();
                self.sessions.send_replace(Some(session.clone()));
                Ok(Some(session))
            }
            Err(_) => {
                info!("Sign-up awaiting email confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.sessions.borrow().as_ref().map(|s| s.access_token.clone());
        if let Some(token) = token {
            let (status, body) = self.post("/logout", Some(&token), &json!({})).await?;
            if !(200..300).contains(&status) && status != 401 {
                error!(status, "Sign-out request failed");
                return Err(AuthError::Provider(error_message(&body)));
            }
        }
        self.sessions.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_message(body), "Invalid login credentials");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }
}
