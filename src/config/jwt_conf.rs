use std::env;
use tracing::{debug, error, info};

use crate::config::ConfigError;

/// Settings used to verify access tokens issued by the auth provider.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Project JWT secret the auth provider signs access tokens with
    pub jwt_secret: String,
    /// Expected `aud` claim
    pub jwt_audience: String,
    /// Clock skew tolerated when checking `exp`, in seconds
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SUPABASE_JWT_SECRET: secret used to verify HS256 access tokens (required, >= 32 chars)
    /// - JWT_AUDIENCE: expected audience (defaults to "authenticated")
    /// - JWT_LEEWAY_SECS: clock skew tolerance (defaults to 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .map_err(|_| {
                error!("SUPABASE_JWT_SECRET environment variable not found");
                ConfigError::EnvVarNotFound("SUPABASE_JWT_SECRET".to_string())
            })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let jwt_audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());
        debug!("JWT audience: {}", jwt_audience);

        let leeway_secs = env::var("JWT_LEEWAY_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|e| {
                error!("Invalid JWT_LEEWAY_SECS value: {}", e);
                ConfigError::InvalidValue(format!("JWT_LEEWAY_SECS: {}", e))
            })?;

        let config = JwtConfig { jwt_secret, jwt_audience, leeway_secs };
        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError("JWT secret must be at least 32 characters long".to_string()));
        }
        if self.jwt_audience.is_empty() {
            return Err(ConfigError::ValidationError("JWT audience cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration for tests and local development
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security_purposes".to_string(),
            jwt_audience: "authenticated".to_string(),
            leeway_secs: 0,
        }
    }
}
