use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer testimonial. Only approved reviews are ever shown publicly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub name: String,
    pub role: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub name: String,
    pub role: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}
