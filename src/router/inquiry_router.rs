use axum::{middleware, routing::{delete, get, post, put}, Router};
use std::sync::Arc;

use crate::handler::inquiry_handler::{
    create_inquiry_handler,
    delete_inquiry_handler,
    list_inquiries_handler,
    update_inquiry_status_handler,
};
use crate::middlewares::admin_middleware::{admin_auth, AuthState};
use crate::service::inquiry_service::InquiryService;

pub fn inquiry_router(service: Arc<InquiryService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new().route("/inquiries", post(create_inquiry_handler));

    let admin = Router::new()
        .route("/inquiries", get(list_inquiries_handler))
        .route("/inquiries/{id}/status", put(update_inquiry_status_handler))
        .route("/inquiries/{id}", delete(delete_inquiry_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public.merge(admin).with_state(service)
}
