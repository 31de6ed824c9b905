use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an admin notification points at; `reference_id` is that entity's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Inquiry,
    Quote,
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub reference_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub reference_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    /// An unread, unassigned notification for the admin team.
    pub fn for_admins(kind: NotificationKind, reference_id: Uuid, message: String, created_by: Option<Uuid>) -> Self {
        Self {
            kind,
            reference_id: Some(reference_id),
            message,
            is_read: false,
            created_by,
            assigned_to: None,
            created_at: Utc::now(),
        }
    }
}
