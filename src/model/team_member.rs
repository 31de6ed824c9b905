use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TeamMemberInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 100))]
    pub role: String,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}
