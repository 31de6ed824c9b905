//! Table-style access to the hosted relational store.
//!
//! Every repository talks to the remote database through [`TableClient`]:
//! select with projection/filter/order/limit, insert, update and delete.
//! Rows travel as JSON objects; typing happens one layer up in
//! [`crate::repository::table::Table`].

use async_trait::async_trait;
use serde_json::Value;

use crate::repository::repository_error::RepositoryResult;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Neq(String, Value),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn neq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Neq(column.to_string(), value.into())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::Neq(column, _) => column,
        }
    }

    /// Whether a JSON row satisfies this filter.
    pub fn matches(&self, row: &Value) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, value) => cell == value,
            Filter::Neq(_, value) => cell != value,
        }
    }

    /// Query-string pair in PostgREST operator syntax, e.g. `("status", "eq.pending")`.
    pub fn to_query_pair(&self) -> (String, String) {
        let (op, value) = match self {
            Filter::Eq(_, value) => ("eq", value),
            Filter::Neq(_, value) => ("neq", value),
        };
        let rendered = match value {
            Value::Null => {
                let op = if op == "eq" { "is" } else { "not.is" };
                return (self.column().to_string(), format!("{op}.null"));
            }
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        (self.column().to_string(), format!("{op}.{rendered}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Projection, filters, ordering and limit for a select.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn neq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::neq(column, value));
        self
    }

    pub fn asc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), direction: Direction::Ascending });
        self
    }

    pub fn desc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), direction: Direction::Descending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone().unwrap_or_else(|| "*".to_string()))];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if let Some(order) = &self.order {
            let dir = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[async_trait]
pub trait TableClient: Send + Sync {
    async fn select(&self, table: &str, query: &TableQuery) -> RepositoryResult<Vec<Value>>;
    /// Inserts one row and returns it as stored (server defaults applied).
    async fn insert(&self, table: &str, row: Value) -> RepositoryResult<Value>;
    /// Applies `patch` to every row matching `filters`, returning the updated rows.
    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> RepositoryResult<Vec<Value>>;
    /// Deletes every row matching `filters`, returning how many were removed.
    async fn delete(&self, table: &str, filters: &[Filter]) -> RepositoryResult<u64>;
    async fn count(&self, table: &str, filters: &[Filter]) -> RepositoryResult<u64>;
}
