use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The single `company_details` row shown in the footer, contact page and stats counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub id: Uuid,
    pub company_name: String,
    pub tagline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub years_experience: Option<i32>,
    pub pools_serviced: Option<i32>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanyDetailsInput {
    #[validate(length(min = 2, max = 120))]
    pub company_name: String,
    pub tagline: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 30))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    #[validate(url)]
    pub facebook_url: Option<String>,
    #[validate(url)]
    pub instagram_url: Option<String>,
    #[validate(url)]
    pub linkedin_url: Option<String>,
    #[validate(range(min = 0))]
    pub years_experience: Option<i32>,
    #[validate(range(min = 0))]
    pub pools_serviced: Option<i32>,
}
