use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::model::notification::{NewNotification, NotificationKind};
use crate::model::quote::{NewQuoteRequest, QuoteLine, QuoteRequest, QuoteStatus};
use crate::repository::notification_repo::NotificationRepository;
use crate::repository::profile_repo::{ProfileContactUpdate, ProfileRepository};
use crate::repository::quote_repo::QuoteRepository;
use crate::service::auth_service::AuthUser;
use crate::service::background::BackgroundTasks;
use crate::service::email_dispatch_service::{DispatchItem, DispatchKind, EmailDispatchRequest, EmailDispatchService};
use crate::util::error::ServiceError;

/// Contact details entered alongside a quote. Present fields are also copied
/// onto the user's profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub full_name: Option<String>,
    /// Falls back to the account email when absent.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
}

impl ContactDetails {
    fn profile_update(&self) -> ProfileContactUpdate {
        ProfileContactUpdate {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            address: self.address.clone(),
        }
    }
}

#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Stores the quote, then queues the admin notification, the email dispatch
    /// and the profile update without waiting for them.
    async fn submit_quote(
        &self,
        user: &AuthUser,
        contact: &ContactDetails,
        lines: Vec<QuoteLine>,
    ) -> Result<QuoteRequest, ServiceError>;
    async fn list_quotes(&self) -> Result<Vec<QuoteRequest>, ServiceError>;
    async fn quotes_for_user(&self, user_id: Uuid) -> Result<Vec<QuoteRequest>, ServiceError>;
    async fn update_quote_status(&self, id: Uuid, status: QuoteStatus) -> Result<QuoteRequest, ServiceError>;
}

pub struct QuoteServiceImpl {
    pub quote_repo: QuoteRepository,
    pub notification_repo: NotificationRepository,
    pub profile_repo: ProfileRepository,
    pub email_dispatch: Option<Arc<EmailDispatchService>>,
    pub background: BackgroundTasks,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

impl QuoteServiceImpl {
    pub fn new(
        quote_repo: QuoteRepository,
        notification_repo: NotificationRepository,
        profile_repo: ProfileRepository,
        email_dispatch: Option<Arc<EmailDispatchService>>,
        background: BackgroundTasks,
    ) -> Self {
        Self { quote_repo, notification_repo, profile_repo, email_dispatch, background }
    }

    // Nothing reconciles a stored quote whose notification or email was lost;
    // the quote id in the warning is the only trace.
    fn queue_side_effects(&self, quote: &QuoteRequest, user: &AuthUser, contact: &ContactDetails) {
        let quote_id = quote.id;
        let account_email = non_blank(Some(&user.email));
        let customer_email = non_blank(contact.email.as_ref()).or_else(|| account_email.clone());
        let customer_name = non_blank(contact.full_name.as_ref())
            .or(account_email)
            .unwrap_or_else(|| "a customer".to_string());
        let item_count: u32 = quote.items.iter().map(|line| line.quantity).sum();

        let notifications = self.notification_repo.clone();
        let notification = NewNotification::for_admins(
            NotificationKind::Quote,
            quote_id,
            format!("New quote request from {} ({} items)", customer_name, item_count),
            Some(user.id),
        );
        self.background.enqueue("quote_notification", async move {
            notifications
                .create(&notification)
                .await
                .map(|_| ())
                .map_err(|e| format!("notification for quote {} not stored: {}", quote_id, e))
        });

        match &self.email_dispatch {
            Some(dispatch) => {
                let dispatch = dispatch.clone();
                if customer_email.is_none() {
                    warn!(quote_id = %quote_id, "No customer address known; only the admin is mailed");
                }
                let request = EmailDispatchRequest {
                    kind: DispatchKind::Quote,
                    customer_name,
                    customer_email: customer_email.unwrap_or_default(),
                    items: Some(
                        quote
                            .items
                            .iter()
                            .map(|line| DispatchItem { name: line.product_name.clone(), quantity: line.quantity })
                            .collect(),
                    ),
                };
                self.background.enqueue("quote_email", async move {
                    dispatch
                        .dispatch(&request)
                        .await
                        .map(|_| ())
                        .map_err(|e| format!("email for quote {} not sent: {}", quote_id, e))
                });
            }
            None => warn!(quote_id = %quote_id, "Email dispatch not configured; skipping quote email"),
        }

        let update = contact.profile_update();
        if !update.is_empty() {
            let profiles = self.profile_repo.clone();
            let user_id = user.id;
            self.background.enqueue("profile_update", async move {
                profiles
                    .update_contact(user_id, &update)
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("profile of user {} not updated: {}", user_id, e))
            });
        }
    }
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self, user, contact, lines), fields(user_id = %user.id, lines = lines.len()))]
    async fn submit_quote(
        &self,
        user: &AuthUser,
        contact: &ContactDetails,
        lines: Vec<QuoteLine>,
    ) -> Result<QuoteRequest, ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::InvalidInput("A quote needs at least one item".to_string()));
        }
        if let Some(bad) = lines.iter().find(|line| line.quantity == 0) {
            return Err(ServiceError::InvalidInput(format!("Quantity for {} must be at least 1", bad.product_name)));
        }

        let now = Utc::now();
        let new_quote = NewQuoteRequest {
            user_id: user.id,
            items: lines,
            status: QuoteStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let quote = self.quote_repo.create(&new_quote).await.map_err(|e| {
            error!("Quote request could not be stored: {}", e);
            ServiceError::from(e)
        })?;
        info!(quote_id = %quote.id, "Quote request stored");

        self.queue_side_effects(&quote, user, contact);
        Ok(quote)
    }

    async fn list_quotes(&self) -> Result<Vec<QuoteRequest>, ServiceError> {
        self.quote_repo.get_all().await.map_err(ServiceError::from)
    }

    async fn quotes_for_user(&self, user_id: Uuid) -> Result<Vec<QuoteRequest>, ServiceError> {
        self.quote_repo.get_for_user(user_id).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    async fn update_quote_status(&self, id: Uuid, status: QuoteStatus) -> Result<QuoteRequest, ServiceError> {
        let updated = self.quote_repo.update_status(id, status).await.map_err(ServiceError::from)?;
        info!(quote_id = %id, status = %status, "Quote status updated");
        Ok(updated)
    }
}
