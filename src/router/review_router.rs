use axum::{middleware, routing::{delete, get, put}, Router};
use std::sync::Arc;

use crate::handler::review_handler::{
    create_review_handler,
    delete_review_handler,
    list_all_reviews_handler,
    list_approved_reviews_handler,
    set_review_approval_handler,
};
use crate::middlewares::admin_middleware::{admin_auth, AuthState};
use crate::service::review_service::ReviewService;

pub fn review_router(service: Arc<ReviewService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/reviews", get(list_approved_reviews_handler).post(create_review_handler));

    let admin = Router::new()
        .route("/reviews/all", get(list_all_reviews_handler))
        .route("/reviews/{id}/approval", put(set_review_approval_handler))
        .route("/reviews/{id}", delete(delete_review_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public.merge(admin).with_state(service)
}
