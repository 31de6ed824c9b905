use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::config::BackendConfig;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::table_client::{Filter, TableClient, TableQuery};

/// [`TableClient`] speaking the PostgREST dialect of the hosted platform.
pub struct RestTableClient {
    http: Client,
    rest_url: String,
    api_key: String,
    bearer: String,
}

impl RestTableClient {
    pub fn new(config: &BackendConfig) -> RepositoryResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepositoryError::connection(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            rest_url: config.rest_url(),
            api_key: config.anon_key.clone(),
            bearer: config.server_key().to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    async fn read_rows(response: Response) -> RepositoryResult<Vec<Value>> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        if !(200..300).contains(&status) {
            error!(status, body = %text, "Table request failed");
            return Err(RepositoryError::from_status(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            row @ Value::Object(_) => Ok(vec![row]),
            other => Err(RepositoryError::serialization(format!("Unexpected response shape: {}", other))),
        }
    }
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_query_pair).collect()
}

#[async_trait]
impl TableClient for RestTableClient {
    #[instrument(skip(self, query), fields(table = %table))]
    async fn select(&self, table: &str, query: &TableQuery) -> RepositoryResult<Vec<Value>> {
        debug!(?query, "Selecting rows");
        let response = self
            .request(reqwest::Method::GET, table)
            .query(&query.to_query_pairs())
            .send()
            .await?;
        Self::read_rows(response).await
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: &str, row: Value) -> RepositoryResult<Value> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::database(format!("Insert into {} returned no row", table)))
    }

    #[instrument(skip(self, patch), fields(table = %table))]
    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> RepositoryResult<Vec<Value>> {
        if filters.is_empty() {
            return Err(RepositoryError::validation("Refusing to update without filters"));
        }
        let response = self
            .request(reqwest::Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(&filter_pairs(filters))
            .json(&patch)
            .send()
            .await?;
        Self::read_rows(response).await
    }

    #[instrument(skip(self), fields(table = %table))]
    async fn delete(&self, table: &str, filters: &[Filter]) -> RepositoryResult<u64> {
        if filters.is_empty() {
            return Err(RepositoryError::validation("Refusing to delete without filters"));
        }
        let response = self
            .request(reqwest::Method::DELETE, table)
            .header("Prefer", "return=representation")
            .query(&filter_pairs(filters))
            .send()
            .await?;
        Ok(Self::read_rows(response).await?.len() as u64)
    }

    /// `HEAD` with `Prefer: count=exact`; the total comes back in `Content-Range` (`0-9/42`, `*/0`).
    #[instrument(skip(self), fields(table = %table))]
    async fn count(&self, table: &str, filters: &[Filter]) -> RepositoryResult<u64> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filter_pairs(filters));
        let response = self
            .request(reqwest::Method::HEAD, table)
            .header("Prefer", "count=exact")
            .query(&query)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            error!(status, "Count request failed");
            return Err(RepositoryError::from_status(status, "count request rejected"));
        }
        let range = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        range
            .rsplit_once('/')
            .and_then(|(_, total)| total.parse().ok())
            .ok_or_else(|| RepositoryError::serialization(format!("No row count in Content-Range '{}'", range)))
    }
}
