use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::model::partner::{Partner, PartnerInput};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::{stamped, Table};
use crate::repository::table_client::{TableClient, TableQuery};

pub const PARTNERS_TABLE: &str = "partners";

#[derive(Clone)]
pub struct PartnerRepository {
    table: Table<Partner>,
}

impl PartnerRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, PARTNERS_TABLE) }
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> RepositoryResult<Vec<Partner>> {
        let res = self.table.select(TableQuery::new().asc("display_order")).await;
        if let Err(e) = &res {
            error!("Failed to fetch partners: {}", e);
        }
        res
    }

    pub async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<Partner>> {
        self.table.select_one(TableQuery::new().eq("id", id.to_string())).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &PartnerInput) -> RepositoryResult<Partner> {
        self.table.insert(&stamped(input, "created_at")?).await
    }

    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(&self, id: Uuid, input: &PartnerInput) -> RepositoryResult<Partner> {
        self.table.update_by_id(&id.to_string(), input).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.table.delete_by_id(&id.to_string()).await
    }
}
