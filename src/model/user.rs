use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    User,
}

/// Row of `user_roles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleRow {
    pub user_id: Uuid,
    pub role: AppRole,
}

/// Contact profile kept per auth user in `profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
