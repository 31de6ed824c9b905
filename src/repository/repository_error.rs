#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Already Exists: {0}")]
    AlreadyExists(String),
    #[error("Validation Error: {0}")]
    ValidationError(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Connection Error: {0}")]
    ConnectionError(String),
    #[error("Serialization Error: {0}")]
    SerializationError(String),
    /// Row-level security or the API key rejected the request
    #[error("Permission Denied: {0}")]
    PermissionDenied(String),
    #[error("Repository Error: {0}")]
    Generic(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        RepositoryError::NotFound(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        RepositoryError::AlreadyExists(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        RepositoryError::ValidationError(msg.into())
    }

    pub fn database<T: Into<String>>(msg: T) -> Self {
        RepositoryError::DatabaseError(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        RepositoryError::ConnectionError(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RepositoryError::SerializationError(msg.into())
    }

    /// Maps a non-success response from the table API onto the error taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 | 406 => RepositoryError::NotFound(body.to_string()),
            409 => RepositoryError::AlreadyExists(body.to_string()),
            400 | 422 => RepositoryError::ValidationError(body.to_string()),
            401 | 403 => RepositoryError::PermissionDenied(body.to_string()),
            _ => RepositoryError::DatabaseError(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            RepositoryError::ConnectionError(format!("Request failed: {}", err))
        } else if err.is_decode() {
            RepositoryError::SerializationError(format!("Invalid response body: {}", err))
        } else {
            RepositoryError::Generic(Box::new(err))
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(format!("JSON error: {}", err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
