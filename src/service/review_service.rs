use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::review_dto::CreateReviewRequest;
use crate::model::notification::{NewNotification, NotificationKind};
use crate::model::review::{NewReview, Review};
use crate::repository::notification_repo::NotificationRepository;
use crate::repository::review_repo::ReviewRepository;
use crate::service::background::BackgroundTasks;
use crate::util::error::ServiceError;
use crate::util::rate_limiter::{minutes_remaining, AttemptLimiter};

pub struct ReviewService {
    repo: ReviewRepository,
    notifications: NotificationRepository,
    limiter: AttemptLimiter,
    background: BackgroundTasks,
}

impl ReviewService {
    pub fn new(
        repo: ReviewRepository,
        notifications: NotificationRepository,
        limiter: AttemptLimiter,
        background: BackgroundTasks,
    ) -> Self {
        Self { repo, notifications, limiter, background }
    }

    pub async fn approved(&self) -> Result<Vec<Review>, ServiceError> {
        Ok(self.repo.get_approved().await?)
    }

    pub async fn all(&self) -> Result<Vec<Review>, ServiceError> {
        Ok(self.repo.get_all().await?)
    }

    /// Stores the review for moderation. It stays hidden until approved.
    #[instrument(skip(self, form), fields(name = %form.name, rating = form.rating))]
    pub async fn submit(&self, form: CreateReviewRequest) -> Result<Review, ServiceError> {
        let key = format!("review_{}", form.email.trim().to_lowercase());
        if self.limiter.is_blocked(&key) {
            let minutes = minutes_remaining(self.limiter.remaining_block_time(&key));
            return Err(ServiceError::RateLimited(format!(
                "Too many submissions, please try again in {} minutes",
                minutes
            )));
        }
        self.limiter.record_attempt(&key);

        let review = self
            .repo
            .create(&NewReview {
                name: form.name,
                role: form.role,
                rating: form.rating,
                comment: form.comment,
                is_approved: false,
                created_at: Utc::now(),
            })
            .await?;

        let review_id = review.id;
        let notifications = self.notifications.clone();
        let notification = NewNotification::for_admins(
            NotificationKind::Review,
            review_id,
            format!("New {}-star review from {} awaiting approval", review.rating, review.name),
            None,
        );
        self.background.enqueue("review_notification", async move {
            notifications
                .create(&notification)
                .await
                .map(|_| ())
                .map_err(|e| format!("notification for review {} not stored: {}", review_id, e))
        });

        info!(review_id = %review_id, "Review submitted for moderation");
        Ok(review)
    }

    pub async fn set_approved(&self, id: Uuid, approved: bool) -> Result<Review, ServiceError> {
        Ok(self.repo.set_approved(id, approved).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(self.repo.delete(id).await?)
    }
}
