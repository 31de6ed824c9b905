use axum::{body::Body, extract::State, http::Request, http::StatusCode, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::{error, warn};

use crate::model::user::AppRole;
use crate::repository::profile_repo::ProfileRepository;
use crate::service::auth_service::{AuthUser, Session};
use crate::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl};

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub profiles: ProfileRepository,
}

fn session_from_request(state: &AuthState, req: &Request<Body>) -> Result<(Session, Claims), StatusCode> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let claims = state.jwt_utils.validate_access_token(&token).map_err(|e| {
        warn!("Rejected access token: {}", e);
        StatusCode::UNAUTHORIZED
    })?;
    let user_id = claims.user_id().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let session = Session {
        access_token: token,
        refresh_token: None,
        expires_at: Some(claims.exp),
        user: AuthUser { id: user_id, email: claims.email.clone().unwrap_or_default() },
    };
    Ok((session, claims))
}

/// Any signed-in user. Puts the caller's [`Session`] and [`Claims`] into the request extensions.
pub async fn user_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let (session, claims) = session_from_request(&state, &req)?;
    req.extensions_mut().insert(session);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Signed-in user whose `user_roles` row says admin.
pub async fn admin_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let (session, claims) = session_from_request(&state, &req)?;

    let role = state.profiles.get_role(session.user.id).await.map_err(|e| {
        error!("Role lookup failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if role != Some(AppRole::Admin) {
        warn!(user_id = %session.user.id, "Non-admin attempted an admin route");
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
