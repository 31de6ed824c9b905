use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handler::function_handler::{product_recommendations_handler, send_notification_email_handler, FunctionState};

pub fn function_router(state: Arc<FunctionState>) -> Router {
    Router::new()
        .route("/functions/send-notification-email", post(send_notification_email_handler))
        .route("/functions/product-recommendations", post(product_recommendations_handler))
        .with_state(state)
}
