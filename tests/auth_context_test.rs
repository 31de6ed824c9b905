mod common;

use async_trait::async_trait;
use common::{grant_admin, init_tracing, limiter, memory_client};
use poolcare_backend::model::user::AppRole;
use poolcare_backend::repository::profile_repo::ProfileRepository;
use poolcare_backend::service::auth_service::{AuthContext, AuthError, AuthProvider, AuthSnapshot, AuthUser, Session};
use poolcare_backend::service::feedback::Feedback;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Auth provider that accepts one password and publishes sessions like the hosted one.
struct FakeProvider {
    user_id: Uuid,
    password: String,
    sessions: watch::Sender<Option<Session>>,
    sign_in_calls: AtomicUsize,
}

impl FakeProvider {
    fn new(user_id: Uuid) -> Arc<Self> {
        let (sessions, _) = watch::channel(None);
        Arc::new(Self {
            user_id,
            password: "correct horse".to_string(),
            sessions,
            sign_in_calls: AtomicUsize::new(0),
        })
    }

    fn session_for(&self, email: &str) -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: None,
            user: AuthUser { id: self.user_id, email: email.to_string() },
        }
    }
}

#[async_trait]
impl AuthProvider for FakeProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if password != self.password {
            return Err(AuthError::InvalidCredentials);
        }
        let session = self.session_for(email);
        self.sessions.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, _email: &str, _password: &str, _full_name: Option<&str>) -> Result<Option<Session>, AuthError> {
        Ok(None)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sessions.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

#[derive(Default)]
struct RecordingFeedback {
    messages: Mutex<Vec<(bool, String, String)>>,
}

impl RecordingFeedback {
    fn errors(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().filter(|m| !m.0).map(|m| m.2.clone()).collect()
    }

    fn successes(&self) -> Vec<String> {
        self.messages.lock().unwrap().iter().filter(|m| m.0).map(|m| m.1.clone()).collect()
    }
}

impl Feedback for RecordingFeedback {
    fn success(&self, title: &str, message: &str) {
        self.messages.lock().unwrap().push((true, title.to_string(), message.to_string()));
    }

    fn error(&self, title: &str, message: &str) {
        self.messages.lock().unwrap().push((false, title.to_string(), message.to_string()));
    }
}

async fn settled(context: &AuthContext, done: impl FnMut(&AuthSnapshot) -> bool) -> AuthSnapshot {
    let mut rx = context.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(done))
        .await
        .expect("auth state did not settle")
        .expect("auth state channel closed")
        .clone();
    snapshot
}

#[tokio::test]
async fn test_admin_role_resolved_after_sign_in() {
    init_tracing();
    let (_, client) = memory_client();
    let user_id = Uuid::new_v4();
    grant_admin(&client, user_id).await;
    let provider = FakeProvider::new(user_id);
    let feedback = Arc::new(RecordingFeedback::default());
    let context = AuthContext::start(provider.clone(), ProfileRepository::new(client), limiter(5), feedback.clone());

    assert!(!context.is_authenticated());
    context.sign_in("admin@example.com", "correct horse").await.unwrap();

    let snapshot = settled(&context, |s| s.is_authenticated() && !s.role_pending).await;
    assert!(snapshot.is_admin());
    assert_eq!(context.role(), Some(AppRole::Admin));
    assert_eq!(context.user().unwrap().id, user_id);
    assert_eq!(feedback.successes(), vec!["Welcome back"]);
}

#[tokio::test]
async fn test_user_without_role_row_is_not_admin() {
    let (_, client) = memory_client();
    let provider = FakeProvider::new(Uuid::new_v4());
    let context = AuthContext::start(
        provider,
        ProfileRepository::new(client),
        limiter(5),
        Arc::new(RecordingFeedback::default()),
    );

    context.sign_in("visitor@example.com", "correct horse").await.unwrap();
    let snapshot = settled(&context, |s| s.is_authenticated() && !s.role_pending).await;

    assert!(!snapshot.is_admin());
    assert_eq!(snapshot.role, None);
}

#[tokio::test]
async fn test_failed_role_lookup_treats_user_as_non_admin() {
    let (memory, client) = memory_client();
    let user_id = Uuid::new_v4();
    grant_admin(&client, user_id).await;
    memory.fail_table("user_roles");
    let context = AuthContext::start(
        FakeProvider::new(user_id),
        ProfileRepository::new(client),
        limiter(5),
        Arc::new(RecordingFeedback::default()),
    );

    context.sign_in("admin@example.com", "correct horse").await.unwrap();
    let snapshot = settled(&context, |s| s.is_authenticated() && !s.role_pending).await;

    assert!(!snapshot.is_admin());
}

#[tokio::test]
async fn test_sign_in_error_reaches_feedback_and_caller() {
    let (_, client) = memory_client();
    let feedback = Arc::new(RecordingFeedback::default());
    let context = AuthContext::start(
        FakeProvider::new(Uuid::new_v4()),
        ProfileRepository::new(client),
        limiter(5),
        feedback.clone(),
    );

    let result = context.sign_in("visitor@example.com", "wrong").await;

    assert_eq!(result, Err(AuthError::InvalidCredentials));
    assert_eq!(feedback.errors(), vec!["Invalid login credentials"]);
    assert!(!context.is_authenticated());
}

#[tokio::test]
async fn test_repeated_failures_block_sign_in() {
    let (_, client) = memory_client();
    let provider = FakeProvider::new(Uuid::new_v4());
    let feedback = Arc::new(RecordingFeedback::default());
    let context = AuthContext::start(provider.clone(), ProfileRepository::new(client), limiter(5), feedback.clone());

    for _ in 0..5 {
        assert_eq!(context.sign_in("visitor@example.com", "wrong").await, Err(AuthError::InvalidCredentials));
    }
    let blocked = context.sign_in("Visitor@Example.com", "correct horse").await;

    assert!(matches!(blocked, Err(AuthError::RateLimited { minutes: 15 })));
    assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 5);
    assert!(feedback.errors().last().unwrap().contains("15 minutes"));
}

#[tokio::test]
async fn test_successful_sign_in_resets_attempts() {
    let (_, client) = memory_client();
    let context = AuthContext::start(
        FakeProvider::new(Uuid::new_v4()),
        ProfileRepository::new(client),
        limiter(3),
        Arc::new(RecordingFeedback::default()),
    );

    for _ in 0..2 {
        let _ = context.sign_in("visitor@example.com", "wrong").await;
    }
    context.sign_in("visitor@example.com", "correct horse").await.unwrap();
    for _ in 0..2 {
        let _ = context.sign_in("visitor@example.com", "wrong").await;
    }

    assert!(context.sign_in("visitor@example.com", "correct horse").await.is_ok());
}

#[tokio::test]
async fn test_sign_out_clears_session_and_role() {
    let (_, client) = memory_client();
    let user_id = Uuid::new_v4();
    grant_admin(&client, user_id).await;
    let feedback = Arc::new(RecordingFeedback::default());
    let context = AuthContext::start(
        FakeProvider::new(user_id),
        ProfileRepository::new(client),
        limiter(5),
        feedback.clone(),
    );

    context.sign_in("admin@example.com", "correct horse").await.unwrap();
    settled(&context, |s| s.is_admin()).await;
    context.sign_out().await.unwrap();

    let snapshot = settled(&context, |s| !s.is_authenticated()).await;
    assert_eq!(snapshot.role, None);
    assert!(!snapshot.role_pending);
    assert_eq!(feedback.successes(), vec!["Welcome back", "Signed out"]);
}

#[tokio::test]
async fn test_sign_up_without_session_asks_for_confirmation() {
    let (_, client) = memory_client();
    let feedback = Arc::new(RecordingFeedback::default());
    let context = AuthContext::start(
        FakeProvider::new(Uuid::new_v4()),
        ProfileRepository::new(client),
        limiter(5),
        feedback.clone(),
    );

    let session = context.sign_up("new@example.com", "pw123456", Some("New Owner")).await.unwrap();

    assert!(session.is_none());
    let messages = feedback.messages.lock().unwrap().clone();
    assert_eq!(messages[0].2, "Check your email to confirm your account.");
}
