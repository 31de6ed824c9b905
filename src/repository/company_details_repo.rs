use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::model::company_details::{CompanyDetails, CompanyDetailsInput};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::{stamped, Table};
use crate::repository::table_client::{TableClient, TableQuery};

pub const COMPANY_DETAILS_TABLE: &str = "company_details";

/// The single-row `company_details` table.
#[derive(Clone)]
pub struct CompanyDetailsRepository {
    table: Table<CompanyDetails>,
}

impl CompanyDetailsRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, COMPANY_DETAILS_TABLE) }
    }

    #[instrument(skip(self))]
    pub async fn get(&self) -> RepositoryResult<Option<CompanyDetails>> {
        let res = self.table.select_one(TableQuery::new()).await;
        if let Ok(None) = &res {
            warn!("No company details row configured");
        }
        res
    }

    /// Updates the existing row, or creates it on first save.
    #[instrument(skip(self, input))]
    pub async fn update(&self, input: &CompanyDetailsInput) -> RepositoryResult<CompanyDetails> {
        let patch = stamped(input, "updated_at")?;
        match self.get().await? {
            Some(current) => {
                info!("Updating company details");
                self.table.update_by_id(&current.id.to_string(), &patch).await
            }
            None => {
                info!("Creating company details");
                self.table.insert(&patch).await
            }
        }
    }
}
