//! Product recommendations from an OpenAI-compatible chat-completion API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::config::LlmConfig;

const RECOMMENDATION_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub product_name: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("recommendations are not configured")]
    NotConfigured,
    #[error("upstream rate limit exceeded")]
    RateLimited,
    #[error("upstream credits exhausted")]
    PaymentRequired,
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(String),
    #[error("could not parse recommendations: {0}")]
    Parse(String),
}

pub struct RecommendationService {
    http: reqwest::Client,
    config: LlmConfig,
}

impl RecommendationService {
    pub fn new(config: LlmConfig) -> Result<Self, RecommendationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| RecommendationError::Request(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[instrument(skip(self, current_products), fields(category = %category_slug, current = current_products.len()))]
    pub async fn recommend(
        &self,
        category_slug: &str,
        current_products: &[String],
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let prompt = format!(
            "A customer is browsing the \"{category}\" category of a pool maintenance shop. \
             Products already in view: {current}. Suggest {count} complementary pool products \
             they might also need. Reply with only a JSON array of objects with the keys \
             \"productName\" and \"reason\" (one short sentence).",
            category = category_slug,
            current = if current_products.is_empty() { "none".to_string() } else { current_products.join(", ") },
            count = RECOMMENDATION_COUNT,
        );
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": "You are a helpful pool maintenance product expert." },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecommendationError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| RecommendationError::Request(e.to_string()))?;
        match status {
            200 => {}
            429 => {
                warn!("Recommendation provider rate limited the request");
                return Err(RecommendationError::RateLimited);
            }
            402 => {
                warn!("Recommendation provider requires payment");
                return Err(RecommendationError::PaymentRequired);
            }
            _ => {
                error!(status, "Recommendation provider error");
                return Err(RecommendationError::Upstream { status, body: text });
            }
        }

        let content = serde_json::from_str::<Value>(&text)
            .map_err(|e| RecommendationError::Parse(e.to_string()))?
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RecommendationError::Parse("response has no message content".to_string()))?;

        let recommendations = parse_recommendations(&content)?;
        info!(count = recommendations.len(), "Recommendations generated");
        Ok(recommendations)
    }
}

/// Accepts a bare JSON array or `{"recommendations": [...]}`, optionally in a
/// fenced code block, and keeps the first four entries.
pub fn parse_recommendations(content: &str) -> Result<Vec<Recommendation>, RecommendationError> {
    let trimmed = strip_fence(content.trim());
    let value: Value = serde_json::from_str(trimmed).map_err(|e| RecommendationError::Parse(e.to_string()))?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut fields) => fields
            .remove("recommendations")
            .ok_or_else(|| RecommendationError::Parse("missing recommendations field".to_string()))?,
        other => return Err(RecommendationError::Parse(format!("unexpected JSON: {}", other))),
    };
    let mut recommendations: Vec<Recommendation> =
        serde_json::from_value(list).map_err(|e| RecommendationError::Parse(e.to_string()))?;
    recommendations.truncate(RECOMMENDATION_COUNT);
    Ok(recommendations)
}

fn strip_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // drop an optional language tag on the opening fence
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
