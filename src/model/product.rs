use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_availability() -> String {
    "available".to_string()
}

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_availability")]
    pub availability: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable product fields, used for both create and update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_availability")]
    #[validate(length(min = 2, max = 40))]
    pub availability: String,
}
