use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::model::team_member::{TeamMember, TeamMemberInput};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::{stamped, Table};
use crate::repository::table_client::{TableClient, TableQuery};

pub const TEAM_TABLE: &str = "team_members";

#[derive(Clone)]
pub struct TeamRepository {
    table: Table<TeamMember>,
}

impl TeamRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, TEAM_TABLE) }
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> RepositoryResult<Vec<TeamMember>> {
        let res = self.table.select(TableQuery::new().asc("display_order")).await;
        if let Err(e) = &res {
            error!("Failed to fetch team members: {}", e);
        }
        res
    }

    pub async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Option<TeamMember>> {
        self.table.select_one(TableQuery::new().eq("id", id.to_string())).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &TeamMemberInput) -> RepositoryResult<TeamMember> {
        info!("Adding team member");
        self.table.insert(&stamped(input, "created_at")?).await
    }

    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(&self, id: Uuid, input: &TeamMemberInput) -> RepositoryResult<TeamMember> {
        self.table.update_by_id(&id.to_string(), input).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.table.delete_by_id(&id.to_string()).await
    }
}
