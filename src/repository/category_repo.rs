use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::model::category::{Category, CategoryInput};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::table::{stamped, Table};
use crate::repository::table_client::{TableClient, TableQuery};

pub const CATEGORIES_TABLE: &str = "categories";

/// `categories`, in display order.
#[derive(Clone)]
pub struct CategoryRepository {
    table: Table<Category>,
}

impl CategoryRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, CATEGORIES_TABLE) }
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> RepositoryResult<Vec<Category>> {
        let res = self.table.select(TableQuery::new().asc("display_order")).await;
        match &res {
            Ok(categories) => info!("Fetched {} categories", categories.len()),
            Err(e) => error!("Failed to fetch categories: {}", e),
        }
        res
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<Category>> {
        self.table.select_one(TableQuery::new().eq("id", id.to_string())).await
    }

    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>> {
        self.table.select_one(TableQuery::new().eq("slug", slug)).await
    }

    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &CategoryInput) -> RepositoryResult<Category> {
        if self.get_by_slug(&input.slug).await?.is_some() {
            return Err(RepositoryError::already_exists(format!("Category slug {} is taken", input.slug)));
        }
        let row = stamped(input, "created_at")?;
        self.table.insert(&row).await
    }

    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(&self, id: Uuid, input: &CategoryInput) -> RepositoryResult<Category> {
        self.table.update_by_id(&id.to_string(), input).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.table.delete_by_id(&id.to_string()).await
    }
}
