use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::table_client::{Direction, Filter, TableClient, TableQuery};

/// In-process [`TableClient`] used for local runs and tests.
///
/// Rows get a generated `id` when inserted without one. Tables can be marked
/// unavailable to simulate provider outages.
#[derive(Default)]
pub struct InMemoryTableClient {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    unavailable: Mutex<HashSet<String>>,
}

impl InMemoryTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent request against `table` fails with a database error.
    pub fn fail_table(&self, table: &str) {
        self.unavailable.lock().unwrap_or_else(|e| e.into_inner()).insert(table.to_string());
    }

    pub fn restore_table(&self, table: &str) {
        self.unavailable.lock().unwrap_or_else(|e| e.into_inner()).remove(table);
    }

    /// Raw copy of a table's rows in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn check_available(&self, table: &str) -> RepositoryResult<()> {
        if self.unavailable.lock().unwrap_or_else(|e| e.into_inner()).contains(table) {
            return Err(RepositoryError::database(format!("Table {} is unavailable", table)));
        }
        Ok(())
    }
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().unwrap_or(0.0).partial_cmp(&y.as_f64().unwrap_or(0.0)).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // nulls sort last
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn project(row: &Value, columns: &Option<String>) -> Value {
    let Some(columns) = columns.as_deref().filter(|c| c.trim() != "*") else {
        return row.clone();
    };
    let mut out = Map::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(cell) = row.get(column) {
            out.insert(column.to_string(), cell.clone());
        }
    }
    Value::Object(out)
}

#[async_trait]
impl TableClient for InMemoryTableClient {
    async fn select(&self, table: &str, query: &TableQuery) -> RepositoryResult<Vec<Value>> {
        self.check_available(table)?;
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches_all(r, &query.filters)).cloned().collect())
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let a = a.get(&order.column).unwrap_or(&Value::Null);
                let b = b.get(&order.column).unwrap_or(&Value::Null);
                match order.direction {
                    Direction::Ascending => compare_cells(a, b),
                    Direction::Descending => compare_cells(b, a),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows.iter().map(|r| project(r, &query.columns)).collect())
    }

    async fn insert(&self, table: &str, row: Value) -> RepositoryResult<Value> {
        self.check_available(table)?;
        let Value::Object(mut fields) = row else {
            return Err(RepositoryError::validation("Rows must be JSON objects"));
        };
        if fields.get("id").map_or(true, Value::is_null) {
            fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        let stored = Value::Object(fields);
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> RepositoryResult<Vec<Value>> {
        self.check_available(table)?;
        let Value::Object(patch) = patch else {
            return Err(RepositoryError::validation("Patch must be a JSON object"));
        };
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches_all(r, filters)) {
                if let Value::Object(fields) = row {
                    for (key, value) in &patch {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> RepositoryResult<u64> {
        self.check_available(table)?;
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !matches_all(r, filters));
        Ok((before - rows.len()) as u64)
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> RepositoryResult<u64> {
        self.check_available(table)?;
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables.get(table).map_or(0, |rows| rows.iter().filter(|r| matches_all(r, filters)).count()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id_and_select_orders() {
        let client = InMemoryTableClient::new();
        client.insert("team_members", json!({ "name": "B", "display_order": 2 })).await.unwrap();
        let first = client.insert("team_members", json!({ "name": "A", "display_order": 1 })).await.unwrap();
        assert!(first["id"].is_string());

        let rows = client.select("team_members", &TableQuery::new().asc("display_order")).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_respect_filters() {
        let client = InMemoryTableClient::new();
        client.insert("reviews", json!({ "id": "1", "is_approved": false })).await.unwrap();
        client.insert("reviews", json!({ "id": "2", "is_approved": false })).await.unwrap();

        let updated = client
            .update("reviews", &[Filter::eq("id", "1")], json!({ "is_approved": true }))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);

        let approved = client.select("reviews", &TableQuery::new().eq("is_approved", true)).await.unwrap();
        assert_eq!(approved.len(), 1);

        assert_eq!(client.delete("reviews", &[Filter::eq("id", "2")]).await.unwrap(), 1);
        assert_eq!(client.rows("reviews").len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_table_errors() {
        let client = InMemoryTableClient::new();
        client.fail_table("notifications");
        assert!(client.insert("notifications", json!({})).await.is_err());
        client.restore_table("notifications");
        assert!(client.insert("notifications", json!({})).await.is_ok());
    }
}
