use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 2, max = 80))]
    pub name: String,
    #[validate(length(min = 2, max = 80))]
    pub slug: String,
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}
