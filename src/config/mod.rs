pub mod app_conf;
pub mod backend_conf;
pub mod email_conf;
pub mod jwt_conf;
pub mod llm_conf;
pub mod rate_limit_conf;


pub use app_conf::AppConfig;
pub use backend_conf::BackendConfig;
pub use email_conf::EmailConfig;
pub use jwt_conf::JwtConfig;
pub use llm_conf::LlmConfig;
pub use rate_limit_conf::RateLimitConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    
    #[error("Validation error: {0}")]
    ValidationError(String),
    
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Reads an optional numeric variable, falling back to `default` when unset.
pub(crate) fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(format!("Invalid {key} value: {raw}"))),
        Err(_) => Ok(default),
    }
}
