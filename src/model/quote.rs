use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    InReview,
    Completed,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::InReview => "in review",
            QuoteStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// One line of a submitted quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
}

/// A row of `quote_requests`: the whole cart, written once at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<QuoteLine>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewQuoteRequest {
    pub user_id: Uuid,
    pub items: Vec<QuoteLine>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
