use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PartnerInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}
