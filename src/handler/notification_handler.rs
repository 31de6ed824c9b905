use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::handler::parse_id;
use crate::model::notification::Notification;
use crate::service::notification_service::NotificationService;
use crate::service::resource::Resource;
use crate::util::error::HandlerError;

#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    pub limit: Option<usize>,
}

pub async fn list_notifications_handler(
    State(service): State<Arc<NotificationService>>,
    Query(params): Query<NotificationListParams>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.recent(params.limit).await?))
}

pub async fn unread_notifications_handler(
    State(service): State<Arc<NotificationService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let notifications = service.unread().await?;
    Ok(Json(json!({ "count": notifications.len(), "notifications": notifications })))
}

pub async fn mark_notification_read_handler(
    State(service): State<Arc<NotificationService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "notification")?;
    Ok(Json(service.mark_as_read(id).await?))
}

pub async fn mark_all_notifications_read_handler(
    State(service): State<Arc<NotificationService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service.mark_all_as_read().await?;
    Ok(Json(json!({ "updated": updated })))
}

/// Unread feed as last refreshed by the poller; no store round trip.
pub async fn notification_feed_handler(
    State(feed): State<Arc<Resource<Vec<Notification>>>>,
) -> impl IntoResponse {
    let state = feed.snapshot();
    let notifications = state.data.unwrap_or_default();
    Json(json!({
        "count": notifications.len(),
        "notifications": notifications,
        "loading": state.loading,
        "error": state.error,
    }))
}
