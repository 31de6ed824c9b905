use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::table_client::{Filter, TableClient, TableQuery};

/// A remote table whose rows decode into `T`.
pub struct Table<T> {
    client: Arc<dyn TableClient>,
    name: &'static str,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), name: self.name, _row: PhantomData }
    }
}

impl<T: DeserializeOwned> Table<T> {
    pub fn new(client: Arc<dyn TableClient>, name: &'static str) -> Self {
        Self { client, name, _row: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, row: Value) -> RepositoryResult<T> {
        serde_json::from_value(row).map_err(|e| {
            RepositoryError::serialization(format!("Failed to decode {} row: {}", self.name, e))
        })
    }

    fn encode<P: Serialize>(&self, payload: &P) -> RepositoryResult<Value> {
        serde_json::to_value(payload).map_err(|e| {
            RepositoryError::serialization(format!("Failed to encode {} row: {}", self.name, e))
        })
    }

    pub async fn select(&self, query: TableQuery) -> RepositoryResult<Vec<T>> {
        self.client
            .select(self.name, &query)
            .await?
            .into_iter()
            .map(|row| self.decode(row))
            .collect()
    }

    /// Server-side row count; no rows are transferred.
    pub async fn count(&self, filters: &[Filter]) -> RepositoryResult<u64> {
        self.client.count(self.name, filters).await
    }

    pub async fn select_one(&self, query: TableQuery) -> RepositoryResult<Option<T>> {
        let rows = self.client.select(self.name, &query.limit(1)).await?;
        rows.into_iter().next().map(|row| self.decode(row)).transpose()
    }

    pub async fn insert<P: Serialize>(&self, payload: &P) -> RepositoryResult<T> {
        let row = self.encode(payload)?;
        let stored = self.client.insert(self.name, row).await?;
        self.decode(stored)
    }

    pub async fn update<P: Serialize>(&self, filters: &[Filter], patch: &P) -> RepositoryResult<Vec<T>> {
        let patch = self.encode(patch)?;
        self.client
            .update(self.name, filters, patch)
            .await?
            .into_iter()
            .map(|row| self.decode(row))
            .collect()
    }

    /// Updates exactly one row by id; `NotFound` when nothing matched.
    pub async fn update_by_id<P: Serialize>(&self, id: &str, patch: &P) -> RepositoryResult<T> {
        self.update(&[Filter::eq("id", id)], patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found(format!("No {} row with id {}", self.name, id)))
    }

    pub async fn delete(&self, filters: &[Filter]) -> RepositoryResult<u64> {
        self.client.delete(self.name, filters).await
    }

    pub async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
        match self.delete(&[Filter::eq("id", id)]).await? {
            0 => Err(RepositoryError::not_found(format!("No {} row with id {}", self.name, id))),
            _ => Ok(()),
        }
    }
}

/// Encodes `payload` and stamps `column` with the current time.
pub fn stamped<P: Serialize>(payload: &P, column: &str) -> RepositoryResult<Value> {
    let mut row = serde_json::to_value(payload)?;
    match row.as_object_mut() {
        Some(fields) => {
            fields.insert(column.to_string(), serde_json::to_value(chrono::Utc::now())?);
            Ok(row)
        }
        None => Err(RepositoryError::serialization("Row payload must be a JSON object")),
    }
}
