use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::quote::{QuoteLine, QuoteStatus};
use crate::service::quote_cart::QuoteItem;
use crate::service::quote_service::ContactDetails;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuoteItemRequest {
    #[validate(length(min = 1, max = 64))]
    pub id: String,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    pub description: Option<String>,

    pub category: Option<String>,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: u32,

    pub availability: Option<String>,
}

impl From<QuoteItemRequest> for QuoteItem {
    fn from(item: QuoteItemRequest) -> Self {
        QuoteItem {
            id: item.id,
            name: item.name,
            description: item.description,
            category: item.category,
            quantity: item.quantity,
            availability: item.availability,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 120))]
    pub company: Option<String>,

    #[validate(length(max = 300))]
    pub address: Option<String>,
}

impl From<ContactRequest> for ContactDetails {
    fn from(contact: ContactRequest) -> Self {
        ContactDetails {
            full_name: contact.full_name,
            email: contact.email,
            phone: contact.phone,
            company: contact.company,
            address: contact.address,
        }
    }
}

/// Body of `POST /quotes`: the client's cart plus optional contact details.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitQuoteRequest {
    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<QuoteItemRequest>,

    #[serde(default)]
    #[validate(nested)]
    pub contact: ContactRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuoteStatusRequest {
    pub status: QuoteStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteSubmittedResponse {
    pub id: uuid::Uuid,
    pub status: QuoteStatus,
    pub items: Vec<QuoteLine>,
    pub message: String,
}
