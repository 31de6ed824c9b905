use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::model::notification::{NewNotification, Notification};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::Table;
use crate::repository::table_client::{Filter, TableClient, TableQuery};

pub const NOTIFICATIONS_TABLE: &str = "notifications";

#[derive(Clone)]
pub struct NotificationRepository {
    table: Table<Notification>,
}

impl NotificationRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self { table: Table::new(client, NOTIFICATIONS_TABLE) }
    }

    #[instrument(skip(self, notification), fields(kind = ?notification.kind))]
    pub async fn create(&self, notification: &NewNotification) -> RepositoryResult<Notification> {
        let res = self.table.insert(notification).await;
        match &res {
            Ok(created) => info!(notification_id = %created.id, "Notification created"),
            Err(e) => error!("Failed to create notification: {}", e),
        }
        res
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self, limit: usize) -> RepositoryResult<Vec<Notification>> {
        self.table.select(TableQuery::new().desc("created_at").limit(limit)).await
    }

    #[instrument(skip(self))]
    pub async fn get_unread(&self) -> RepositoryResult<Vec<Notification>> {
        self.table.select(TableQuery::new().eq("is_read", false).desc("created_at")).await
    }

    pub async fn unread_count(&self) -> RepositoryResult<usize> {
        let count = self.table.count(&[Filter::eq("is_read", false)]).await?;
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn mark_as_read(&self, id: Uuid) -> RepositoryResult<Notification> {
        self.table.update_by_id(&id.to_string(), &json!({ "is_read": true })).await
    }

    #[instrument(skip(self))]
    pub async fn mark_all_as_read(&self) -> RepositoryResult<usize> {
        let updated = self.table.update(&[Filter::eq("is_read", false)], &json!({ "is_read": true })).await?;
        info!("Marked {} notifications as read", updated.len());
        Ok(updated.len())
    }
}
