use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::dto::inquiry_dto::{CreateInquiryRequest, UpdateInquiryStatusRequest};
use crate::handler::{parse_id, validate_payload};
use crate::service::inquiry_service::InquiryService;
use crate::util::error::HandlerError;

// Handler: Public contact/service form
pub async fn create_inquiry_handler(
    State(service): State<Arc<InquiryService>>,
    Json(payload): Json<CreateInquiryRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let inquiry = service.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

// Handler: List Inquiries (admin only)
pub async fn list_inquiries_handler(
    State(service): State<Arc<InquiryService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list().await?))
}

// Handler: Update Inquiry Status (admin only)
pub async fn update_inquiry_status_handler(
    State(service): State<Arc<InquiryService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInquiryStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "inquiry")?;
    Ok(Json(service.update_status(id, payload.status).await?))
}

// Handler: Delete Inquiry (admin only)
pub async fn delete_inquiry_handler(
    State(service): State<Arc<InquiryService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "inquiry")?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
