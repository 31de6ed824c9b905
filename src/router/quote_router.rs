use axum::{middleware, routing::{get, post, put}, Router};
use std::sync::Arc;

use crate::handler::quote_handler::{
    list_quotes_handler,
    my_quotes_handler,
    submit_quote_handler,
    update_quote_status_handler,
};
use crate::middlewares::admin_middleware::{admin_auth, user_auth, AuthState};
use crate::service::quote_service::QuoteServiceImpl;

pub fn quote_router(service: Arc<QuoteServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Signed-in users
    let user = Router::new()
        .route("/quotes", post(submit_quote_handler))
        .route("/quotes/mine", get(my_quotes_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), user_auth));

    // Admin-protected routes
    let admin = Router::new()
        .route("/quotes", get(list_quotes_handler))
        .route("/quotes/{id}/status", put(update_quote_status_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    user.merge(admin).with_state(service)
}
