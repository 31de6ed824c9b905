use axum::{middleware, routing::{get, post, put}, Router};
use std::sync::Arc;

use crate::handler::catalog_handler::*;
use crate::middlewares::admin_middleware::{admin_auth, AuthState};
use crate::service::catalog_service::CatalogService;

pub fn catalog_router(service: Arc<CatalogService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/products", get(list_products_handler))
        .route("/products/{id}", get(get_product_handler))
        .route("/categories", get(list_categories_handler))
        .route("/categories/{key}", get(get_category_handler))
        .route("/team", get(list_team_handler))
        .route("/partners", get(list_partners_handler))
        .route("/company-details", get(get_company_details_handler));

    let admin = Router::new()
        .route("/products", post(create_product_handler))
        .route("/products/{id}", put(update_product_handler).delete(delete_product_handler))
        .route("/categories", post(create_category_handler))
        .route("/categories/{key}", put(update_category_handler).delete(delete_category_handler))
        .route("/team", post(create_team_member_handler))
        .route("/team/{id}", put(update_team_member_handler).delete(delete_team_member_handler))
        .route("/partners", post(create_partner_handler))
        .route("/partners/{id}", put(update_partner_handler).delete(delete_partner_handler))
        .route("/company-details", put(update_company_details_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public.merge(admin).with_state(service)
}
