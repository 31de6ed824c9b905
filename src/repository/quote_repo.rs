use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::model::quote::{NewQuoteRequest, QuoteRequest, QuoteStatus};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::Table;
use crate::repository::table_client::{TableClient, TableQuery};

pub const QUOTE_REQUESTS_TABLE: &str = "quote_requests";

/// `quote_requests`. Rows are never deleted; only admins change their status.
#[derive(Clone)]
pub struct QuoteRepository {
    table: Table<QuoteRequest>,
}

impl QuoteRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, QUOTE_REQUESTS_TABLE) }
    }

    #[instrument(skip(self, quote), fields(user_id = %quote.user_id, lines = quote.items.len()))]
    pub async fn create(&self, quote: &NewQuoteRequest) -> RepositoryResult<QuoteRequest> {
        info!("Creating new quote request");
        let res = self.table.insert(quote).await;
        match &res {
            Ok(created) => info!(quote_id = %created.id, "Quote request created successfully"),
            Err(e) => error!("Failed to create quote request: {}", e),
        }
        res
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<QuoteRequest>> {
        self.table.select_one(TableQuery::new().eq("id", id.to_string())).await
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> RepositoryResult<Vec<QuoteRequest>> {
        let res = self.table.select(TableQuery::new().desc("created_at")).await;
        match &res {
            Ok(quotes) => info!("Fetched {} quote requests", quotes.len()),
            Err(e) => error!("Failed to list quote requests: {}", e),
        }
        res
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<QuoteRequest>> {
        self.table
            .select(TableQuery::new().eq("user_id", user_id.to_string()).desc("created_at"))
            .await
    }

    #[instrument(skip(self), fields(id = %id, status = %status))]
    pub async fn update_status(&self, id: Uuid, status: QuoteStatus) -> RepositoryResult<QuoteRequest> {
        info!(quote_id = %id, status = %status, "Updating quote status");
        let patch = json!({ "status": status, "updated_at": Utc::now() });
        let res = self.table.update_by_id(&id.to_string(), &patch).await;
        if let Err(e) = &res {
            error!("Failed to update quote status: {}", e);
        }
        res
    }
}
