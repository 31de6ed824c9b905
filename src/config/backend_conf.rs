use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Connection settings for the hosted database/auth platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public (anon) API key, sent as `apikey` on every request
    pub anon_key: String,
    /// Privileged key used for server-side writes (optional)
    pub service_role_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Load backend configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SUPABASE_URL: project URL (required)
    /// - SUPABASE_ANON_KEY: anon API key (required)
    /// - SUPABASE_SERVICE_ROLE_KEY: service role key (optional)
    /// - BACKEND_TIMEOUT_SECS: request timeout (defaults to 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading backend configuration from environment variables");

        let url = env::var("SUPABASE_URL")
            .map_err(|_| {
                error!("SUPABASE_URL environment variable not found");
                ConfigError::EnvVarNotFound("SUPABASE_URL".to_string())
            })?
            .trim_end_matches('/')
            .to_string();
        debug!("Backend URL: {}", url);

        let anon_key = env::var("SUPABASE_ANON_KEY")
            .map_err(|_| {
                error!("SUPABASE_ANON_KEY environment variable not found");
                ConfigError::EnvVarNotFound("SUPABASE_ANON_KEY".to_string())
            })?;
        debug!("Anon key: [REDACTED]");

        let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY").ok().filter(|k| !k.is_empty());
        if service_role_key.is_none() {
            warn!("SUPABASE_SERVICE_ROLE_KEY not set, server-side writes use the anon key");
        }

        let timeout_secs = env::var("BACKEND_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid BACKEND_TIMEOUT_SECS value");
                ConfigError::InvalidValue("Invalid BACKEND_TIMEOUT_SECS value".to_string())
            })?;

        let config = BackendConfig { url, anon_key, service_role_key, timeout_secs };
        config.validate()?;
        info!("Backend configuration loaded successfully");
        Ok(config)
    }

    /// Create BackendConfig for testing
    pub fn from_test_env() -> Self {
        BackendConfig {
            url: "http://localhost:54321".to_string(),
            anon_key: "test-anon-key".to_string(),
            service_role_key: None,
            timeout_secs: 5,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError("SUPABASE_URL must be an http(s) URL".to_string()));
        }
        if self.anon_key.is_empty() {
            return Err(ConfigError::ValidationError("SUPABASE_ANON_KEY cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("BACKEND_TIMEOUT_SECS cannot be 0".to_string()));
        }
        Ok(())
    }

    /// Key used for table requests made by the server itself.
    pub fn server_key(&self) -> &str {
        self.service_role_key.as_deref().unwrap_or(&self.anon_key)
    }

    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_config_is_valid() {
        assert!(BackendConfig::from_test_env().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut config = BackendConfig::from_test_env();
        config.url = "localhost:54321".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_key_prefers_service_role() {
        let mut config = BackendConfig::from_test_env();
        assert_eq!(config.server_key(), "test-anon-key");
        config.service_role_key = Some("service".to_string());
        assert_eq!(config.server_key(), "service");
    }

    #[test]
    fn test_endpoint_urls() {
        let config = BackendConfig::from_test_env();
        assert_eq!(config.rest_url(), "http://localhost:54321/rest/v1");
        assert_eq!(config.auth_url(), "http://localhost:54321/auth/v1");
    }
}
