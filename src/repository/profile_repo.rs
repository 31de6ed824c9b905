use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::model::user::{AppRole, Profile, UserRoleRow};
use crate::repository::repository_error::RepositoryResult;
use crate::repository::table::Table;
use crate::repository::table_client::{Filter, TableClient, TableQuery};

pub const PROFILES_TABLE: &str = "profiles";
pub const USER_ROLES_TABLE: &str = "user_roles";

/// Contact fields copied onto the profile when a quote is submitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileContactUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none() && self.company.is_none() && self.address.is_none()
    }
}

/// `profiles` and `user_roles`.
#[derive(Clone)]
pub struct ProfileRepository {
    profiles: Table<Profile>,
    roles: Table<UserRoleRow>,
}

impl ProfileRepository {
    pub fn new(client: Arc<dyn TableClient>) -> Self {
        Self {
            profiles: Table::new(client.clone(), PROFILES_TABLE),
            roles: Table::new(client, USER_ROLES_TABLE),
        }
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get(&self, user_id: Uuid) -> RepositoryResult<Option<Profile>> {
        self.profiles.select_one(TableQuery::new().eq("id", user_id.to_string())).await
    }

    /// Writes the given contact fields; creates the profile row if the user has none yet.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_contact(&self, user_id: Uuid, update: &ProfileContactUpdate) -> RepositoryResult<Profile> {
        let mut patch = serde_json::to_value(update)?;
        if let Some(fields) = patch.as_object_mut() {
            fields.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        }
        let updated = self.profiles.update(&[Filter::eq("id", user_id.to_string())], &patch).await?;
        if let Some(profile) = updated.into_iter().next() {
            info!("Profile contact details updated");
            return Ok(profile);
        }
        if let Some(fields) = patch.as_object_mut() {
            fields.insert("id".to_string(), serde_json::Value::String(user_id.to_string()));
        }
        info!("Creating profile with contact details");
        self.profiles.insert(&patch).await
    }

    /// Role recorded for the user; `None` when no role row exists.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_role(&self, user_id: Uuid) -> RepositoryResult<Option<AppRole>> {
        let row = self.roles.select_one(TableQuery::new().eq("user_id", user_id.to_string())).await?;
        debug!(role = ?row.as_ref().map(|r| r.role), "Resolved user role");
        Ok(row.map(|r| r.role))
    }
}
