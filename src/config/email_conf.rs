use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// SMTP settings plus the addresses notification mail is sent from and to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub use_tls: bool,
    pub use_starttls: bool,
    pub from_email: String,
    /// Display name on outgoing mail, also used as the company name in templates
    pub from_name: String,
    /// Inbox that receives new quote/inquiry/review notifications
    pub admin_email: String,
    pub connection_timeout_secs: u64,
}

fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| {
        error!("{} environment variable not found", key);
        ConfigError::EnvVarNotFound(key.to_string())
    })
}

fn flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => raw.parse::<bool>().unwrap_or(default),
        Err(_) => {
            warn!("{} not set, defaulting to {}", key, default);
            default
        }
    }
}

impl EmailConfig {
    /// Create EmailConfig from environment variables
    ///
    /// Required: SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD, SMTP_FROM_EMAIL, ADMIN_NOTIFICATION_EMAIL.
    /// Optional: SMTP_PORT (587), SMTP_USE_TLS (true), SMTP_USE_STARTTLS (true),
    /// SMTP_FROM_NAME, SMTP_CONNECTION_TIMEOUT (30).
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");

        let smtp_host = required("SMTP_HOST")?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("Invalid SMTP_PORT value".to_string()))?;
        debug!("SMTP server: {}:{}", smtp_host, smtp_port);

        let smtp_username = required("SMTP_USERNAME")?;
        let smtp_password = required("SMTP_PASSWORD")?;
        debug!("SMTP password: [REDACTED]");

        let from_email = required("SMTP_FROM_EMAIL")?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Pool Care".to_string());
        let admin_email = required("ADMIN_NOTIFICATION_EMAIL")?;
        debug!("Admin notifications go to {}", admin_email);

        let connection_timeout_secs = env::var("SMTP_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        let config = EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            use_tls: flag("SMTP_USE_TLS", true),
            use_starttls: flag("SMTP_USE_STARTTLS", true),
            from_email,
            from_name,
            admin_email,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    /// Create EmailConfig for testing
    pub fn from_test_env() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_tls: false,
            use_starttls: false,
            from_email: "test@example.com".to_string(),
            from_name: "Test Pools".to_string(),
            admin_email: "admin@example.com".to_string(),
            connection_timeout_secs: 10,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }
        if self.smtp_port == 0 {
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }
        for (name, address) in [("From email", &self.from_email), ("Admin email", &self.admin_email)] {
            if !address.contains('@') {
                error!("{} has an invalid format", name);
                return Err(ConfigError::ValidationError(format!("{name} must be a valid address")));
            }
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Connection timeout cannot be 0".to_string()));
        }
        Ok(())
    }
}
