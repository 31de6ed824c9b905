#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use poolcare_backend::config::{JwtConfig, RateLimitConfig};
use poolcare_backend::repository::memory_table_client::InMemoryTableClient;
use poolcare_backend::repository::table_client::TableClient;
use poolcare_backend::util::email::{EmailError, EmailMessage, Mailer};
use poolcare_backend::util::rate_limiter::AttemptLimiter;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();
}

pub fn memory_client() -> (Arc<InMemoryTableClient>, Arc<dyn TableClient>) {
    let memory = Arc::new(InMemoryTableClient::new());
    let client: Arc<dyn TableClient> = memory.clone();
    (memory, client)
}

pub fn limiter(max_attempts: u32) -> AttemptLimiter {
    AttemptLimiter::from_config(&RateLimitConfig { max_attempts, ..RateLimitConfig::default() })
}

pub async fn grant_admin(client: &Arc<dyn TableClient>, user_id: Uuid) {
    client
        .insert("user_roles", json!({ "user_id": user_id.to_string(), "role": "admin" }))
        .await
        .expect("Failed to seed admin role");
}

/// Signs an access token the way the auth provider would.
pub fn mint_token(user_id: Uuid, email: &str, expires_in_secs: i64) -> String {
    let config = JwtConfig::default();
    mint_token_with(user_id, email, &config.jwt_secret, &config.jwt_audience, expires_in_secs)
}

pub fn mint_token_with(user_id: Uuid, email: &str, secret: &str, audience: &str, expires_in_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": user_id.to_string(),
        "email": email,
        "role": "authenticated",
        "aud": audience,
        "iat": now,
        "exp": now + expires_in_secs,
    });
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("Failed to sign test token")
}

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail_all: AtomicBool,
    fail_to: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.fail_all.store(true, Ordering::SeqCst);
        mailer
    }

    pub fn failing_for(address: &str) -> Self {
        let mailer = Self::default();
        mailer.fail_to.lock().unwrap().push(address.to_string());
        mailer
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail_all.load(Ordering::SeqCst) || self.fail_to.lock().unwrap().contains(&message.to) {
            return Err(EmailError::SmtpError("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}
