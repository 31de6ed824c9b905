use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    /// Required so repeated submissions can be throttled; never published.
    #[validate(email)]
    pub email: String,

    #[validate(length(max = 100))]
    pub role: Option<String>,

    #[validate(range(min = 1, max = 5))]
    pub rating: u8,

    #[validate(length(min = 10, max = 1000))]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewApprovalRequest {
    pub approved: bool,
}
