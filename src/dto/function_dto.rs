use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[validate(length(min = 1, max = 100))]
    pub category_slug: String,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub current_products: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<crate::service::recommendation_service::Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub success: bool,
    #[serde(rename = "customerConfirmed")]
    pub customer_confirmed: bool,
}
