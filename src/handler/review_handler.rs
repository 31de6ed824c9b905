use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::dto::review_dto::{CreateReviewRequest, ReviewApprovalRequest};
use crate::handler::{parse_id, validate_payload};
use crate::service::review_service::ReviewService;
use crate::util::error::HandlerError;

// Handler: Approved reviews for the public site
pub async fn list_approved_reviews_handler(
    State(service): State<Arc<ReviewService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.approved().await?))
}

// Handler: Submit a review; it stays hidden until approved
pub async fn create_review_handler(
    State(service): State<Arc<ReviewService>>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let review = service.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

// Handler: Every review, for moderation (admin only)
pub async fn list_all_reviews_handler(
    State(service): State<Arc<ReviewService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.all().await?))
}

// Handler: Approve or hide a review (admin only)
pub async fn set_review_approval_handler(
    State(service): State<Arc<ReviewService>>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewApprovalRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "review")?;
    Ok(Json(service.set_approved(id, payload.approved).await?))
}

// Handler: Delete Review (admin only)
pub async fn delete_review_handler(
    State(service): State<Arc<ReviewService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "review")?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
