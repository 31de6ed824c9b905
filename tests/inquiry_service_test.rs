mod common;

use common::{init_tracing, limiter, memory_client, RecordingMailer};
use poolcare_backend::dto::inquiry_dto::CreateInquiryRequest;
use poolcare_backend::model::inquiry::{InquiryKind, InquiryStatus};
use poolcare_backend::repository::inquiry_repo::InquiryRepository;
use poolcare_backend::repository::notification_repo::NotificationRepository;
use poolcare_backend::repository::table_client::TableClient;
use poolcare_backend::service::background::BackgroundTasks;
use poolcare_backend::service::email_dispatch_service::EmailDispatchService;
use poolcare_backend::service::inquiry_service::InquiryService;
use poolcare_backend::util::error::ServiceError;
use std::sync::Arc;

fn form(email: &str) -> CreateInquiryRequest {
    CreateInquiryRequest {
        kind: InquiryKind::Service,
        name: "Noor Lagoon".to_string(),
        email: email.to_string(),
        phone: None,
        service_type: Some("weekly cleaning".to_string()),
        message: "Could someone look at our cloudy pool this week?".to_string(),
    }
}

fn service(
    client: Arc<dyn TableClient>,
    mailer: Option<Arc<RecordingMailer>>,
    max_attempts: u32,
) -> (InquiryService, BackgroundTasks) {
    let background = BackgroundTasks::new();
    let email_dispatch = mailer.map(|m| {
        Arc::new(EmailDispatchService::new(m, "admin@example.com".to_string(), "Test Pools".to_string()))
    });
    let service = InquiryService::new(
        InquiryRepository::new(client.clone()),
        NotificationRepository::new(client),
        email_dispatch,
        limiter(max_attempts),
        background.clone(),
    );
    (service, background)
}

#[tokio::test]
async fn test_submit_stores_inquiry_and_queues_side_effects() {
    init_tracing();
    let (memory, client) = memory_client();
    let mailer = Arc::new(RecordingMailer::default());
    let (service, background) = service(client, Some(mailer.clone()), 5);

    let inquiry = service.submit(form("noor@example.com")).await.unwrap();
    background.drain().await;

    assert_eq!(inquiry.status, InquiryStatus::New);
    assert_eq!(inquiry.kind, InquiryKind::Service);
    assert_eq!(memory.rows("notifications")[0]["type"], "inquiry");
    let recipients: Vec<_> = mailer.sent().into_iter().map(|m| m.to).collect();
    assert_eq!(recipients, vec!["admin@example.com", "noor@example.com"]);
}

#[tokio::test]
async fn test_mail_outage_does_not_fail_submit() {
    let (memory, client) = memory_client();
    memory.fail_table("notifications");
    let (service, background) = service(client, Some(Arc::new(RecordingMailer::failing())), 5);

    assert!(service.submit(form("noor@example.com")).await.is_ok());
    background.drain().await;
    assert_eq!(memory.rows("inquiries").len(), 1);
}

#[tokio::test]
async fn test_storage_failure_is_reported() {
    let (memory, client) = memory_client();
    memory.fail_table("inquiries");
    let (service, background) = service(client, None, 5);

    assert!(service.submit(form("noor@example.com")).await.is_err());
    background.drain().await;
    assert!(memory.rows("notifications").is_empty());
}

#[tokio::test]
async fn test_blocked_sender_is_rejected_before_storing() {
    let (memory, client) = memory_client();
    let (service, _) = service(client, None, 3);

    for _ in 0..3 {
        service.submit(form("noor@example.com")).await.unwrap();
    }
    let blocked = service.submit(form("noor@example.com")).await;

    assert!(matches!(blocked, Err(ServiceError::RateLimited(_))));
    assert_eq!(memory.rows("inquiries").len(), 3);
}

#[tokio::test]
async fn test_status_update_and_delete() {
    let (_, client) = memory_client();
    let (service, _) = service(client, None, 5);
    let inquiry = service.submit(form("noor@example.com")).await.unwrap();

    let updated = service.update_status(inquiry.id, InquiryStatus::Contacted).await.unwrap();
    assert_eq!(updated.status, InquiryStatus::Contacted);

    service.delete(inquiry.id).await.unwrap();
    assert!(service.list().await.unwrap().is_empty());
}
