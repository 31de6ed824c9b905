use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::model::product::{Product, ProductInput};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::{stamped, Table};
use crate::repository::table_client::{TableClient, TableQuery};

pub const PRODUCTS_TABLE: &str = "products";

/// `products`, newest first.
#[derive(Clone)]
pub struct ProductRepository {
    table: Table<Product>,
}

impl ProductRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, PRODUCTS_TABLE) }
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> RepositoryResult<Vec<Product>> {
        let res = self.table.select(TableQuery::new().desc("created_at")).await;
        match &res {
            Ok(products) => info!("Fetched {} products", products.len()),
            Err(e) => error!("Failed to fetch products: {}", e),
        }
        res
    }

    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_by_category(&self, category_id: Uuid) -> RepositoryResult<Vec<Product>> {
        self.table
            .select(TableQuery::new().eq("category_id", category_id.to_string()).desc("created_at"))
            .await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>> {
        self.table.select_one(TableQuery::new().eq("id", id.to_string())).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> RepositoryResult<Product> {
        info!("Creating product");
        let row = stamped(input, "created_at")?;
        self.table.insert(&row).await
    }

    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(&self, id: Uuid, input: &ProductInput) -> RepositoryResult<Product> {
        info!("Updating product");
        let patch = stamped(input, "updated_at")?;
        self.table.update_by_id(&id.to_string(), &patch).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        info!("Deleting product");
        self.table.delete_by_id(&id.to_string()).await
    }
}
