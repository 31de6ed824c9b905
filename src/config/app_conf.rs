use std::env;
use std::time::Duration;

use crate::config::{env_parse, ConfigError};

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// How often the admin notification feed is refreshed.
    pub notification_poll_interval: Duration,
    pub log_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parse("APP_PORT", 8080u16)?;
        let poll_secs = env_parse("NOTIFICATION_POLL_SECS", 30u64)?;
        if poll_secs == 0 {
            return Err(ConfigError::ValidationError("NOTIFICATION_POLL_SECS must be greater than 0".to_string()));
        }
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        Ok(AppConfig {
            host,
            port,
            notification_poll_interval: Duration::from_secs(poll_secs),
            log_dir,
        })
    }
}
