use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryKind {
    Contact,
    Service,
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    New,
    Contacted,
    Resolved,
}

/// A public contact/service form submission, row of `inquiries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: InquiryKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service_type: Option<String>,
    pub message: String,
    pub status: InquiryStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Insert payload; id is assigned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct NewInquiry {
    #[serde(rename = "type")]
    pub kind: InquiryKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service_type: Option<String>,
    pub message: String,
    pub status: InquiryStatus,
    pub submitted_at: DateTime<Utc>,
}
