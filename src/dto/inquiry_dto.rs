use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::inquiry::{InquiryKind, InquiryStatus};

/// Public contact/service form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInquiryRequest {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: InquiryKind,

    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub service_type: Option<String>,

    #[validate(length(min = 10, max = 2000))]
    pub message: String,
}

fn default_kind() -> InquiryKind {
    InquiryKind::Contact
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInquiryStatusRequest {
    pub status: InquiryStatus,
}
