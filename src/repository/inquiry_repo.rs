use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::model::inquiry::{Inquiry, InquiryStatus, NewInquiry};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::Table;
use crate::repository::table_client::{TableClient, TableQuery};

pub const INQUIRIES_TABLE: &str = "inquiries";

/// `inquiries`, most recently submitted first.
#[derive(Clone)]
pub struct InquiryRepository {
    table: Table<Inquiry>,
}

impl InquiryRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, INQUIRIES_TABLE) }
    }

    #[instrument(skip(self, inquiry), fields(kind = ?inquiry.kind, email = %inquiry.email))]
    pub async fn create(&self, inquiry: &NewInquiry) -> RepositoryResult<Inquiry> {
        info!("Creating new inquiry");
        let res = self.table.insert(inquiry).await;
        match &res {
            Ok(created) => info!(inquiry_id = %created.id, "Inquiry created successfully"),
            Err(e) => error!("Failed to create inquiry: {}", e),
        }
        res
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> RepositoryResult<Vec<Inquiry>> {
        self.table.select(TableQuery::new().desc("submitted_at")).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<Inquiry>> {
        self.table.select_one(TableQuery::new().eq("id", id.to_string())).await
    }

    #[instrument(skip(self), fields(id = %id, status = ?status))]
    pub async fn update_status(&self, id: Uuid, status: InquiryStatus) -> RepositoryResult<Inquiry> {
        info!("Updating inquiry status");
        self.table.update_by_id(&id.to_string(), &json!({ "status": status })).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        info!("Deleting inquiry");
        self.table.delete_by_id(&id.to_string()).await
    }
}
