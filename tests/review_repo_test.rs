mod common;

use chrono::{Duration, Utc};
use common::{init_tracing, limiter, memory_client};
use poolcare_backend::dto::review_dto::CreateReviewRequest;
use poolcare_backend::model::review::NewReview;
use poolcare_backend::repository::notification_repo::NotificationRepository;
use poolcare_backend::repository::review_repo::ReviewRepository;
use poolcare_backend::service::background::BackgroundTasks;
use poolcare_backend::service::review_service::ReviewService;
use poolcare_backend::util::error::ServiceError;

fn new_review(name: &str, minutes_ago: i64) -> NewReview {
    NewReview {
        name: name.to_string(),
        role: Some("Villa owner".to_string()),
        rating: 5,
        comment: "Crystal clear water all summer long.".to_string(),
        is_approved: true,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

fn review_form(email: &str) -> CreateReviewRequest {
    CreateReviewRequest {
        name: "Sam Tide".to_string(),
        email: email.to_string(),
        role: None,
        rating: 4,
        comment: "Quick visit and a spotless pool afterwards.".to_string(),
    }
}

#[tokio::test]
async fn test_create_always_stores_unapproved() {
    init_tracing();
    let (_, client) = memory_client();
    let repo = ReviewRepository::new(client);

    let created = repo.create(&new_review("Ali", 0)).await.unwrap();

    assert!(!created.is_approved);
    assert!(repo.get_approved().await.unwrap().is_empty());
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_public_list_only_shows_approved_newest_first() {
    let (_, client) = memory_client();
    let repo = ReviewRepository::new(client);

    let older = repo.create(&new_review("Older", 120)).await.unwrap();
    let newer = repo.create(&new_review("Newer", 5)).await.unwrap();
    repo.create(&new_review("Hidden", 1)).await.unwrap();
    repo.set_approved(older.id, true).await.unwrap();
    repo.set_approved(newer.id, true).await.unwrap();

    let approved = repo.get_approved().await.unwrap();
    let names: Vec<_> = approved.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Newer", "Older"]);
}

#[tokio::test]
async fn test_unapproving_hides_review_again() {
    let (_, client) = memory_client();
    let repo = ReviewRepository::new(client);
    let review = repo.create(&new_review("Flip", 0)).await.unwrap();

    repo.set_approved(review.id, true).await.unwrap();
    assert_eq!(repo.get_approved().await.unwrap().len(), 1);
    let hidden = repo.set_approved(review.id, false).await.unwrap();
    assert!(!hidden.is_approved);
    assert!(repo.get_approved().await.unwrap().is_empty());

    repo.delete(review.id).await.unwrap();
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submitted_review_notifies_admins_and_hides_email() {
    let (memory, client) = memory_client();
    let background = BackgroundTasks::new();
    let service = ReviewService::new(
        ReviewRepository::new(client.clone()),
        NotificationRepository::new(client),
        limiter(5),
        background.clone(),
    );

    let review = service.submit(review_form("sam@example.com")).await.unwrap();
    background.drain().await;

    assert!(!review.is_approved);
    assert!(service.approved().await.unwrap().is_empty());
    let rows = memory.rows("reviews");
    assert!(rows[0].get("email").is_none());

    let notifications = memory.rows("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "review");
    assert_eq!(notifications[0]["reference_id"], review.id.to_string());
}

#[tokio::test]
async fn test_review_submissions_are_throttled_per_email() {
    let (memory, client) = memory_client();
    let service = ReviewService::new(
        ReviewRepository::new(client.clone()),
        NotificationRepository::new(client),
        limiter(2),
        BackgroundTasks::new(),
    );

    service.submit(review_form("sam@example.com")).await.unwrap();
    service.submit(review_form("SAM@example.com ")).await.unwrap();
    let third = service.submit(review_form("sam@example.com")).await;

    assert!(matches!(third, Err(ServiceError::RateLimited(_))));
    assert_eq!(memory.rows("reviews").len(), 2);
    assert!(service.submit(review_form("other@example.com")).await.is_ok());
}
