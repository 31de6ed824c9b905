use axum::{
    extract::{ConnectInfo, State},
    http::{Extensions, HeaderMap},
    response::IntoResponse,
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, warn};

use crate::dto::function_dto::{RecommendationRequest, RecommendationResponse, SendEmailResponse};
use crate::handler::validate_payload;
use crate::service::email_dispatch_service::{EmailDispatchRequest, EmailDispatchService};
use crate::service::recommendation_service::{RecommendationError, RecommendationService};
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::rate_limiter::{minutes_remaining, AttemptLimiter};

/// Either function is `None` when its configuration is missing. Both are
/// public, so every call counts against the caller's attempt budget.
pub struct FunctionState {
    pub email_dispatch: Option<Arc<EmailDispatchService>>,
    pub recommendations: Option<Arc<RecommendationService>>,
    pub limiter: AttemptLimiter,
}

impl FunctionState {
    fn throttle(&self, key: &str) -> Result<(), HandlerError> {
        if self.limiter.is_blocked(key) {
            let minutes = minutes_remaining(self.limiter.remaining_block_time(key));
            warn!(key, "Function call throttled");
            return Err(HandlerError::new(
                HandlerErrorKind::TooManyRequests,
                format!("Too many requests, please try again in {} minutes", minutes),
            ));
        }
        self.limiter.record_attempt(key);
        Ok(())
    }
}

/// First forwarded address, else the peer address when the server exposes it.
fn client_address(headers: &HeaderMap, extensions: &Extensions) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| extensions.get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip().to_string()))
}

// Handler: Templated notification email
pub async fn send_notification_email_handler(
    State(state): State<Arc<FunctionState>>,
    Json(payload): Json<EmailDispatchRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    state.throttle(&format!("email_{}", payload.customer_email.trim().to_lowercase()))?;
    let dispatch = state
        .email_dispatch
        .as_ref()
        .ok_or_else(|| HandlerError::new(HandlerErrorKind::Internal, "Email is not configured"))?;
    let outcome = dispatch.dispatch(&payload).await.map_err(|e| {
        error!("Notification email failed: {}", e);
        HandlerError::new(HandlerErrorKind::Internal, format!("Failed to send email: {}", e))
    })?;
    Ok(Json(SendEmailResponse { success: outcome.admin_notified, customer_confirmed: outcome.customer_confirmed }))
}

impl From<RecommendationError> for HandlerError {
    fn from(err: RecommendationError) -> Self {
        match err {
            RecommendationError::RateLimited => HandlerError::new(
                HandlerErrorKind::TooManyRequests,
                "Rate limits exceeded, please try again later.",
            ),
            RecommendationError::PaymentRequired => HandlerError::new(
                HandlerErrorKind::PaymentRequired,
                "Payment required, please add credits to continue.",
            ),
            RecommendationError::NotConfigured => {
                HandlerError::new(HandlerErrorKind::Internal, "Recommendations are not configured")
            }
            other => HandlerError::new(HandlerErrorKind::Internal, other.to_string()),
        }
    }
}

// Handler: AI product recommendations
pub async fn product_recommendations_handler(
    State(state): State<Arc<FunctionState>>,
    headers: HeaderMap,
    extensions: Extensions,
    Json(payload): Json<RecommendationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let caller = client_address(&headers, &extensions).unwrap_or_else(|| payload.category_slug.clone());
    state.throttle(&format!("recommend_{}", caller))?;
    let service = state.recommendations.as_ref().ok_or(RecommendationError::NotConfigured)?;
    let recommendations = service
        .recommend(&payload.category_slug, &payload.current_products)
        .await
        .map_err(|e| {
            error!("Recommendation request failed: {}", e);
            HandlerError::from(e)
        })?;
    Ok(Json(RecommendationResponse { recommendations }))
}
