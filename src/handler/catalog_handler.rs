use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::handler::parse_id;
use crate::model::category::CategoryInput;
use crate::model::company_details::CompanyDetailsInput;
use crate::model::partner::PartnerInput;
use crate::model::product::ProductInput;
use crate::model::team_member::TeamMemberInput;
use crate::service::catalog_service::CatalogService;
use crate::util::error::HandlerError;

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
}

// --- products ---

pub async fn list_products_handler(
    State(service): State<Arc<CatalogService>>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.products(filter.category_id).await?))
}

pub async fn get_product_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "product")?;
    Ok(Json(service.product(id).await?))
}

pub async fn create_product_handler(
    State(service): State<Arc<CatalogService>>,
    Json(payload): Json<ProductInput>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok((StatusCode::CREATED, Json(service.create_product(&payload).await?)))
}

pub async fn update_product_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    Json(payload): Json<ProductInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "product")?;
    Ok(Json(service.update_product(id, &payload).await?))
}

pub async fn delete_product_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "product")?;
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- categories ---

pub async fn list_categories_handler(
    State(service): State<Arc<CatalogService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.categories().await?))
}

/// Public lookups use the slug; admin updates and deletes use the id.
pub async fn get_category_handler(
    State(service): State<Arc<CatalogService>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.category_by_slug(&slug).await?))
}

pub async fn create_category_handler(
    State(service): State<Arc<CatalogService>>,
    Json(payload): Json<CategoryInput>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok((StatusCode::CREATED, Json(service.create_category(&payload).await?)))
}

pub async fn update_category_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "category")?;
    Ok(Json(service.update_category(id, &payload).await?))
}

pub async fn delete_category_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "category")?;
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- team ---

pub async fn list_team_handler(
    State(service): State<Arc<CatalogService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.team().await?))
}

pub async fn create_team_member_handler(
    State(service): State<Arc<CatalogService>>,
    Json(payload): Json<TeamMemberInput>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok((StatusCode::CREATED, Json(service.create_team_member(&payload).await?)))
}

pub async fn update_team_member_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    Json(payload): Json<TeamMemberInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "team member")?;
    Ok(Json(service.update_team_member(id, &payload).await?))
}

pub async fn delete_team_member_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "team member")?;
    service.delete_team_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- partners ---

pub async fn list_partners_handler(
    State(service): State<Arc<CatalogService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.partners().await?))
}

pub async fn create_partner_handler(
    State(service): State<Arc<CatalogService>>,
    Json(payload): Json<PartnerInput>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok((StatusCode::CREATED, Json(service.create_partner(&payload).await?)))
}

pub async fn update_partner_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    Json(payload): Json<PartnerInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "partner")?;
    Ok(Json(service.update_partner(id, &payload).await?))
}

pub async fn delete_partner_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "partner")?;
    service.delete_partner(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- company details ---

pub async fn get_company_details_handler(
    State(service): State<Arc<CatalogService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.company_details().await?))
}

pub async fn update_company_details_handler(
    State(service): State<Arc<CatalogService>>,
    Json(payload): Json<CompanyDetailsInput>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.update_company_details(&payload).await?))
}
