use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use tracing::{error, info};

use crate::dto::quote_dto::{QuoteSubmittedResponse, SubmitQuoteRequest, UpdateQuoteStatusRequest};
use crate::handler::{parse_id, validate_payload};
use crate::service::auth_service::Session;
use crate::service::quote_cart::{QuoteCart, QuoteItem};
use crate::service::quote_service::{ContactDetails, QuoteService, QuoteServiceImpl};
use crate::util::error::HandlerError;

// Handler: Submit the caller's cart as a quote request (signed-in users)
pub async fn submit_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(session): Extension<Session>,
    Json(payload): Json<SubmitQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;

    // Duplicate lines for the same product collapse into one entry.
    let mut cart = QuoteCart::new();
    for item in payload.items {
        let quantity = item.quantity;
        let already = cart.items().iter().find(|i| i.id == item.id).map_or(0, |i| i.quantity);
        let id = item.id.clone();
        cart.add_item(QuoteItem::from(item));
        cart.update_quantity(&id, i64::from(already) + i64::from(quantity));
    }

    let contact: ContactDetails = payload.contact.into();
    let quote = cart
        .submit_quote(Some(&session), &contact, service.as_ref())
        .await
        .map_err(|e| {
            error!("Failed to submit quote: {}", e);
            HandlerError::from(e)
        })?;
    info!(quote_id = %quote.id, "Quote request accepted");

    let response = QuoteSubmittedResponse {
        id: quote.id,
        status: quote.status,
        items: quote.items,
        message: "Your quote request has been sent. We will contact you shortly.".to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

// Handler: The caller's own quote requests
pub async fn my_quotes_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HandlerError> {
    let quotes = service.quotes_for_user(session.user.id).await?;
    Ok(Json(quotes))
}

// Handler: List Quotes (admin only)
pub async fn list_quotes_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let quotes = service.list_quotes().await?;
    Ok(Json(quotes))
}

// Handler: Update Quote Status (admin only)
pub async fn update_quote_status_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuoteStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    let updated = service.update_quote_status(id, payload.status).await?;
    Ok(Json(updated))
}
