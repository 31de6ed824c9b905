use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::model::review::{NewReview, Review};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::Table;
use crate::repository::table_client::{TableClient, TableQuery};

pub const REVIEWS_TABLE: &str = "reviews";

#[derive(Clone)]
pub struct ReviewRepository {
    table: Table<Review>,
}

impl ReviewRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, REVIEWS_TABLE) }
    }

    /// Reviews for public display: approved rows only, newest first.
    #[instrument(skip(self))]
    pub async fn get_approved(&self) -> RepositoryResult<Vec<Review>> {
        let res = self.table.select(TableQuery::new().eq("is_approved", true).desc("created_at")).await;
        match &res {
            Ok(reviews) => info!("Fetched {} approved reviews", reviews.len()),
            Err(e) => error!("Failed to fetch approved reviews: {}", e),
        }
        res
    }

    /// Every review, for moderation.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> RepositoryResult<Vec<Review>> {
        self.table.select(TableQuery::new().desc("created_at")).await
    }

    /// Stores a new review. It is always created unapproved.
    #[instrument(skip(self, review), fields(name = %review.name, rating = review.rating))]
    pub async fn create(&self, review: &NewReview) -> RepositoryResult<Review> {
        let pending = NewReview { is_approved: false, ..review.clone() };
        let res = self.table.insert(&pending).await;
        match &res {
            Ok(created) => info!(review_id = %created.id, "Review submitted for moderation"),
            Err(e) => error!("Failed to create review: {}", e),
        }
        res
    }

    #[instrument(skip(self), fields(id = %id, approved))]
    pub async fn set_approved(&self, id: Uuid, approved: bool) -> RepositoryResult<Review> {
        info!("Changing review approval");
        self.table.update_by_id(&id.to_string(), &json!({ "is_approved": approved })).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.table.delete_by_id(&id.to_string()).await
    }
}
