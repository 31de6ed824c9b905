use axum::{middleware, routing::{get, put}, Router};
use std::sync::Arc;

use crate::handler::notification_handler::{
    list_notifications_handler,
    mark_all_notifications_read_handler,
    mark_notification_read_handler,
    notification_feed_handler,
    unread_notifications_handler,
};
use crate::model::notification::Notification;
use crate::middlewares::admin_middleware::{admin_auth, AuthState};
use crate::service::notification_service::NotificationService;
use crate::service::resource::Resource;

/// Admin only.
pub fn notification_router(service: Arc<NotificationService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/unread", get(unread_notifications_handler))
        .route("/notifications/read-all", put(mark_all_notifications_read_handler))
        .route("/notifications/{id}/read", put(mark_notification_read_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}

/// Admin only. Serves the poller's cached unread feed.
pub fn notification_feed_router(feed: Arc<Resource<Vec<Notification>>>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/notifications/feed", get(notification_feed_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(feed)
}
