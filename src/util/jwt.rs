use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

/// Claims carried by access tokens the auth provider issues.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (auth user id)
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Database role of the token ("authenticated", "anon", ...), not the app role
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }
}

/// Error types for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Invalid token audience")]
    InvalidAudience,
    #[error("Token subject is not a user id: {0}")]
    InvalidSubject(String),
}

pub trait JwtTokenUtils {
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

/// Verifies HS256 access tokens against the project JWT secret.
#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.jwt_config.jwt_audience.as_str()]);
        validation.leeway = self.jwt_config.leeway_secs;
        validation
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        debug!("Validating access token");
        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());

        match decode::<Claims>(token, &decoding_key, &self.validation()) {
            Ok(data) => {
                debug!("Token validation successful for user: {}", data.claims.sub);
                Ok(data.claims)
            }
            Err(err) => {
                use jsonwebtoken::errors::ErrorKind;
                match err.kind() {
                    ErrorKind::ExpiredSignature => {
                        warn!("Access token has expired");
                        Err(JwtError::TokenExpired)
                    }
                    ErrorKind::InvalidAudience => {
                        warn!("Access token has the wrong audience");
                        Err(JwtError::InvalidAudience)
                    }
                    _ => {
                        error!("Failed to decode JWT token: {}", err);
                        Err(JwtError::DecodingFailed(err.to_string()))
                    }
                }
            }
        }
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            error!("Invalid authorization header format");
            return Err(JwtError::InvalidToken);
        };
        let token = token.trim();
        if token.is_empty() {
            error!("Empty token in authorization header");
            return Err(JwtError::InvalidToken);
        }
        Ok(token.to_string())
    }
}
