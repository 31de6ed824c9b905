use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{env_parse, ConfigError};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_BLOCK_SECS: u64 = 15 * 60;

/// Attempt-throttling settings shared by sign-in and public forms.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window: Duration,
    pub block_duration: Duration,
    /// JSON file backing the attempt records; in-memory when absent.
    pub store_path: Option<PathBuf>,
}

impl RateLimitConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_attempts: env_parse("RATE_LIMIT_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS)?),
            block_duration: Duration::from_secs(env_parse("RATE_LIMIT_BLOCK_SECS", DEFAULT_BLOCK_SECS)?),
            store_path: env::var("RATE_LIMIT_STORE_PATH").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from),
        };
        if config.max_attempts == 0 {
            return Err(ConfigError::ValidationError("RATE_LIMIT_MAX_ATTEMPTS must be greater than 0".to_string()));
        }
        Ok(config)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            block_duration: Duration::from_secs(DEFAULT_BLOCK_SECS),
            store_path: None,
        }
    }
}
