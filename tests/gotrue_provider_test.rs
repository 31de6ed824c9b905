mod common;

use axum::{extract::Query, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use common::{grant_admin, init_tracing, limiter, memory_client};
use poolcare_backend::config::BackendConfig;
use poolcare_backend::repository::profile_repo::ProfileRepository;
use poolcare_backend::service::auth_service::{AuthContext, AuthError, AuthProvider};
use poolcare_backend::service::feedback::TracingFeedback;
use poolcare_backend::service::gotrue_provider::GoTrueAuthProvider;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const USER_ID: &str = "7d4c1c3e-2f7a-4b7e-9d55-0f1f4e0c8a11";

fn has_apikey(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some("test-anon-key")
}

async fn token(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !has_apikey(&headers) || params.get("grant_type").map(String::as_str) != Some("password") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "msg": "bad request" })));
    }
    if body["email"] == "down@example.com" {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "Auth service unavailable" })));
    }
    if body["password"] != "correct horse" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "access_token": "token-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": USER_ID, "email": body["email"] },
        })),
    )
}

async fn signup(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["data"]["full_name"] != "Lina Pool" {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "msg": "missing full name" })));
    }
    // confirmation pending: user object without a session
    (StatusCode::OK, Json(json!({ "id": USER_ID, "email": body["email"], "confirmation_sent_at": "2024-01-01T00:00:00Z" })))
}

async fn logout(headers: HeaderMap) -> StatusCode {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer token-1") => StatusCode::NO_CONTENT,
        _ => StatusCode::FORBIDDEN,
    }
}

async fn spawn_stub() -> SocketAddr {
    let app = Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/logout", post(logout));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn provider_for(addr: SocketAddr) -> GoTrueAuthProvider {
    let config = BackendConfig { url: format!("http://{}", addr), ..BackendConfig::from_test_env() };
    GoTrueAuthProvider::new(&config).unwrap()
}

#[tokio::test]
async fn test_sign_in_publishes_session() {
    let provider = provider_for(spawn_stub().await);
    let mut sessions = provider.subscribe();

    let session = provider.sign_in("lina@example.com", "correct horse").await.unwrap();

    assert_eq!(session.access_token, "token-1");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(session.user.id, Uuid::parse_str(USER_ID).unwrap());
    assert!(session.expires_at.unwrap() > chrono::Utc::now().timestamp());

    assert!(sessions.has_changed().unwrap());
    assert_eq!(sessions.borrow_and_update().as_ref(), Some(&session));
}

#[tokio::test]
async fn test_rejected_password_is_invalid_credentials() {
    let provider = provider_for(spawn_stub().await);
    let result = provider.sign_in("lina@example.com", "wrong").await;
    assert_eq!(result, Err(AuthError::InvalidCredentials));
    assert!(provider.subscribe().borrow().is_none());
}

#[tokio::test]
async fn test_provider_outage_keeps_message() {
    let provider = provider_for(spawn_stub().await);
    let result = provider.sign_in("down@example.com", "correct horse").await;
    assert_eq!(result, Err(AuthError::Provider("Auth service unavailable".to_string())));
}

#[tokio::test]
async fn test_sign_up_awaiting_confirmation_has_no_session() {
    let provider = provider_for(spawn_stub().await);
    let session = provider.sign_up("new@example.com", "secret pass", Some("Lina Pool")).await.unwrap();
    assert!(session.is_none());

    let rejected = provider.sign_up("new@example.com", "secret pass", None).await;
    assert_eq!(rejected, Err(AuthError::Provider("missing full name".to_string())));
}

#[tokio::test]
async fn test_sign_out_sends_token_and_publishes_none() {
    let provider = provider_for(spawn_stub().await);
    provider.sign_in("lina@example.com", "correct horse").await.unwrap();
    let mut sessions = provider.subscribe();

    provider.sign_out().await.unwrap();

    assert!(sessions.has_changed().unwrap());
    assert!(sessions.borrow_and_update().is_none());
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = provider_for(addr).sign_in("lina@example.com", "correct horse").await;
    assert!(matches!(result, Err(AuthError::Network(_))));
}

#[tokio::test]
async fn test_auth_context_over_hosted_provider_resolves_admin() {
    init_tracing();
    let (_, client) = memory_client();
    grant_admin(&client, Uuid::parse_str(USER_ID).unwrap()).await;

    let provider = Arc::new(provider_for(spawn_stub().await));
    let context = AuthContext::start(provider, ProfileRepository::new(client), limiter(5), Arc::new(TracingFeedback));
    context.sign_in("lina@example.com", "correct horse").await.unwrap();

    let mut snapshots = context.subscribe();
    let settled = tokio::time::timeout(
        Duration::from_secs(2),
        snapshots.wait_for(|s| s.session.is_some() && !s.role_pending),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert!(settled.is_admin());
    assert_eq!(settled.user().unwrap().email, "lina@example.com");
}
