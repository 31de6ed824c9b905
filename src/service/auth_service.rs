//! Session state for a signed-in client.
//!
//! [`AuthContext`] follows the provider's session channel. Every change is
//! published at once with the role cleared; the role is then looked up in
//! `user_roles` on its own task, one scheduler tick later, so the lookup
//! never runs inside the provider's notification path. A lookup that
//! finishes after the user changed again is dropped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::model::user::AppRole;
use crate::repository::profile_repo::ProfileRepository;
use crate::service::feedback::Feedback;
use crate::util::rate_limiter::{minutes_remaining, AttemptLimiter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix seconds
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("Too many attempts, try again in {minutes} minutes")]
    RateLimited { minutes: u64 },
    #[error("{0}")]
    Provider(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// The hosted auth service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    /// `None` when the account still needs email confirmation.
    async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> Result<Option<Session>, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub role: Option<AppRole>,
    /// True from a session change until its role lookup settles.
    pub role_pending: bool,
}

impl AuthSnapshot {
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(AppRole::Admin)
    }
}

pub struct AuthContext {
    provider: Arc<dyn AuthProvider>,
    limiter: AttemptLimiter,
    feedback: Arc<dyn Feedback>,
    state: watch::Sender<AuthSnapshot>,
    listener: JoinHandle<()>,
}

fn limiter_key(email: &str) -> String {
    format!("signin_{}", email.trim().to_lowercase())
}

impl AuthContext {
    /// Starts following the provider's session channel. Must be called inside a runtime.
    pub fn start(
        provider: Arc<dyn AuthProvider>,
        profiles: ProfileRepository,
        limiter: AttemptLimiter,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::default());
        let mut sessions = provider.subscribe();
        let publisher = state.clone();

        let listener = tokio::spawn(async move {
            let initial = sessions.borrow_and_update().clone();
            apply_session(&publisher, &profiles, initial);
            while sessions.changed().await.is_ok() {
                let session = sessions.borrow_and_update().clone();
                apply_session(&publisher, &profiles, session);
            }
            debug!("Auth provider session channel closed");
        });

        Self { provider, limiter, feedback, state, listener }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state.borrow().user().cloned()
    }

    pub fn role(&self) -> Option<AppRole> {
        self.state.borrow().role
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let key = limiter_key(email);
        if self.limiter.is_blocked(&key) {
            let minutes = minutes_remaining(self.limiter.remaining_block_time(&key));
            let err = AuthError::RateLimited { minutes };
            self.feedback.error("Too many attempts", &err.to_string());
            return Err(err);
        }

        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                self.limiter.reset(&key);
                info!(user_id = %session.user.id, "Signed in");
                self.feedback.success("Welcome back", "You are now signed in.");
                Ok(session)
            }
            Err(e) => {
                self.limiter.record_attempt(&key);
                warn!("Sign in failed: {}", e);
                self.feedback.error("Sign in failed", &e.to_string());
                Err(e)
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> Result<Option<Session>, AuthError> {
        match self.provider.sign_up(email, password, full_name).await {
            Ok(session) => {
                let message = if session.is_some() {
                    "Your account is ready."
                } else {
                    "Check your email to confirm your account."
                };
                self.feedback.success("Account created", message);
                Ok(session)
            }
            Err(e) => {
                warn!("Sign up failed: {}", e);
                self.feedback.error("Sign up failed", &e.to_string());
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match self.provider.sign_out().await {
            Ok(()) => {
                self.feedback.success("Signed out", "See you soon.");
                Ok(())
            }
            Err(e) => {
                warn!("Sign out failed: {}", e);
                self.feedback.error("Sign out failed", &e.to_string());
                Err(e)
            }
        }
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

fn apply_session(state: &watch::Sender<AuthSnapshot>, profiles: &ProfileRepository, session: Option<Session>) {
    let user_id = session.as_ref().map(|s| s.user.id);
    state.send_modify(|s| {
        s.session = session;
        s.role = None;
        s.role_pending = user_id.is_some();
    });

    let Some(user_id) = user_id else {
        return;
    };
    let state = state.clone();
    let profiles = profiles.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        let role = match profiles.get_role(user_id).await {
            Ok(role) => role,
            Err(e) => {
                warn!(user_id = %user_id, "Role lookup failed: {}", e);
                None
            }
        };
        state.send_if_modified(|s| {
            if s.user().map(|u| u.id) != Some(user_id) {
                debug!(user_id = %user_id, "Discarding stale role lookup");
                return false;
            }
            s.role = role;
            s.role_pending = false;
            true
        });
    });
}
