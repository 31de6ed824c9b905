use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::model::quote::{QuoteLine, QuoteRequest};
use crate::service::auth_service::Session;
use crate::service::quote_service::{ContactDetails, QuoteService};
use crate::util::error::ServiceError;

/// A product the visitor selected, kept in memory until the quote is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: u32,
    pub availability: Option<String>,
}

impl QuoteItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: None,
            quantity: 1,
            availability: None,
        }
    }
}

/// Ordered cart of products; one entry per product id.
#[derive(Debug, Clone, Default)]
pub struct QuoteCart {
    items: Vec<QuoteItem>,
}

impl QuoteCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit. A product already in the cart just gets its quantity bumped.
    pub fn add_item(&mut self, item: QuoteItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity += 1;
                debug!(id = %existing.id, quantity = existing.quantity, "Increased cart quantity");
            }
            None => {
                debug!(id = %item.id, "Added item to cart");
                self.items.push(QuoteItem { quantity: 1, ..item });
            }
        }
    }

    /// Sets the quantity; zero or less removes the item.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity;
        }
    }

    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[QuoteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    fn lines(&self) -> Vec<QuoteLine> {
        self.items
            .iter()
            .map(|item| QuoteLine {
                product_id: item.id.clone(),
                product_name: item.name.clone(),
                quantity: item.quantity,
            })
            .collect()
    }

    /// Sends the cart as one quote request. The cart is emptied only once the
    /// quote is stored; on any error it is left exactly as it was.
    #[instrument(skip_all, fields(items = self.items.len()))]
    pub async fn submit_quote(
        &mut self,
        session: Option<&Session>,
        contact: &ContactDetails,
        service: &dyn QuoteService,
    ) -> Result<QuoteRequest, ServiceError> {
        let Some(session) = session else {
            warn!("Quote submitted without a session");
            return Err(ServiceError::Unauthenticated("Sign in to request a quote".to_string()));
        };
        if self.is_empty() {
            return Err(ServiceError::InvalidInput("Your quote list is empty".to_string()));
        }

        let quote = service.submit_quote(&session.user, contact, self.lines()).await?;
        info!(quote_id = %quote.id, "Quote submitted, clearing cart");
        self.clear();
        Ok(quote)
    }
}
