//! Chat-completion provider settings for product recommendations.

use std::env;

use crate::config::{env_parse, ConfigError};

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl LlmConfig {
    /// Required: `LLM_API_KEY`.
    /// Optional: `LLM_BASE_URL`, `LLM_MODEL`, `LLM_REQUEST_TIMEOUT_SECS` (60),
    /// `LLM_CONNECT_TIMEOUT_SECS` (10).
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("LLM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::EnvVarNotFound("LLM_API_KEY".to_string()))?;
        let base_url = env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
            request_timeout_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", 60)?,
            connect_timeout_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", 10)?,
        })
    }

    pub fn for_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}
