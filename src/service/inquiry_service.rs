use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::inquiry_dto::CreateInquiryRequest;
use crate::model::inquiry::{Inquiry, InquiryStatus, NewInquiry};
use crate::model::notification::{NewNotification, NotificationKind};
use crate::repository::inquiry_repo::InquiryRepository;
use crate::repository::notification_repo::NotificationRepository;
use crate::service::background::BackgroundTasks;
use crate::service::email_dispatch_service::{DispatchKind, EmailDispatchRequest, EmailDispatchService};
use crate::util::error::ServiceError;
use crate::util::rate_limiter::{minutes_remaining, AttemptLimiter};

/// Public inquiry form and its moderation.
pub struct InquiryService {
    repo: InquiryRepository,
    notifications: NotificationRepository,
    email_dispatch: Option<Arc<EmailDispatchService>>,
    limiter: AttemptLimiter,
    background: BackgroundTasks,
}

impl InquiryService {
    pub fn new(
        repo: InquiryRepository,
        notifications: NotificationRepository,
        email_dispatch: Option<Arc<EmailDispatchService>>,
        limiter: AttemptLimiter,
        background: BackgroundTasks,
    ) -> Self {
        Self { repo, notifications, email_dispatch, limiter, background }
    }

    /// Stores the inquiry; admin notification and emails follow in the background.
    /// Every submission counts against the sender's attempt budget.
    #[instrument(skip(self, form), fields(kind = ?form.kind, email = %form.email))]
    pub async fn submit(&self, form: CreateInquiryRequest) -> Result<Inquiry, ServiceError> {
        let key = format!("inquiry_{}", form.email.trim().to_lowercase());
        if self.limiter.is_blocked(&key) {
            let minutes = minutes_remaining(self.limiter.remaining_block_time(&key));
            return Err(ServiceError::RateLimited(format!(
                "Too many submissions, please try again in {} minutes",
                minutes
            )));
        }
        self.limiter.record_attempt(&key);

        let inquiry = self
            .repo
            .create(&NewInquiry {
                kind: form.kind,
                name: form.name,
                email: form.email,
                phone: form.phone,
                service_type: form.service_type,
                message: form.message,
                status: InquiryStatus::New,
                submitted_at: Utc::now(),
            })
            .await?;

        let inquiry_id = inquiry.id;
        let notifications = self.notifications.clone();
        let notification = NewNotification::for_admins(
            NotificationKind::Inquiry,
            inquiry_id,
            format!("New inquiry from {}", inquiry.name),
            None,
        );
        self.background.enqueue("inquiry_notification", async move {
            notifications
                .create(&notification)
                .await
                .map(|_| ())
                .map_err(|e| format!("notification for inquiry {} not stored: {}", inquiry_id, e))
        });

        if let Some(dispatch) = self.email_dispatch.clone() {
            let request = EmailDispatchRequest {
                kind: DispatchKind::Inquiry,
                customer_name: inquiry.name.clone(),
                customer_email: inquiry.email.clone(),
                items: None,
            };
            self.background.enqueue("inquiry_email", async move {
                dispatch
                    .dispatch(&request)
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("email for inquiry {} not sent: {}", inquiry_id, e))
            });
        } else {
            warn!(inquiry_id = %inquiry_id, "Email dispatch not configured; skipping inquiry email");
        }

        info!(inquiry_id = %inquiry_id, "Inquiry submitted");
        Ok(inquiry)
    }

    pub async fn list(&self) -> Result<Vec<Inquiry>, ServiceError> {
        Ok(self.repo.get_all().await?)
    }

    pub async fn update_status(&self, id: Uuid, status: InquiryStatus) -> Result<Inquiry, ServiceError> {
        Ok(self.repo.update_status(id, status).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.repo.delete(id).await?)
    }
}
