mod common;

use common::{init_tracing, memory_client, RecordingMailer};
use poolcare_backend::repository::memory_table_client::InMemoryTableClient;
use poolcare_backend::repository::notification_repo::NotificationRepository;
use poolcare_backend::repository::profile_repo::ProfileRepository;
use poolcare_backend::repository::quote_repo::QuoteRepository;
use poolcare_backend::repository::table_client::TableClient;
use poolcare_backend::service::auth_service::{AuthUser, Session};
use poolcare_backend::service::background::BackgroundTasks;
use poolcare_backend::service::email_dispatch_service::EmailDispatchService;
use poolcare_backend::service::quote_cart::{QuoteCart, QuoteItem};
use poolcare_backend::service::quote_service::{ContactDetails, QuoteServiceImpl};
use poolcare_backend::util::error::ServiceError;
use std::sync::Arc;
use uuid::Uuid;

fn session() -> Session {
    Session {
        access_token: "token".to_string(),
        refresh_token: None,
        expires_at: None,
        user: AuthUser { id: Uuid::new_v4(), email: "owner@example.com".to_string() },
    }
}

fn quote_service(client: Arc<dyn TableClient>, mailer: Option<Arc<RecordingMailer>>) -> QuoteServiceImpl {
    let email_dispatch = mailer.map(|m| {
        Arc::new(EmailDispatchService::new(m, "admin@example.com".to_string(), "Test Pools".to_string()))
    });
    QuoteServiceImpl::new(
        QuoteRepository::new(client.clone()),
        NotificationRepository::new(client.clone()),
        ProfileRepository::new(client),
        email_dispatch,
        BackgroundTasks::new(),
    )
}

fn filled_cart() -> QuoteCart {
    let mut cart = QuoteCart::new();
    cart.add_item(QuoteItem::new("chlorine-tabs", "Chlorine tablets"));
    cart.add_item(QuoteItem::new("skimmer", "Skimmer net"));
    cart.update_quantity("chlorine-tabs", 3);
    cart
}

fn contact() -> ContactDetails {
    ContactDetails {
        full_name: Some("Dana Reef".to_string()),
        email: Some("dana@example.com".to_string()),
        phone: Some("+212600000000".to_string()),
        ..ContactDetails::default()
    }
}

#[test]
fn test_adding_same_product_bumps_quantity() {
    let mut cart = QuoteCart::new();
    cart.add_item(QuoteItem::new("pump", "Pool pump"));
    cart.add_item(QuoteItem::new("pump", "Pool pump"));

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.total_quantity(), 2);
}

#[test]
fn test_added_item_starts_at_one_regardless_of_input_quantity() {
    let mut cart = QuoteCart::new();
    cart.add_item(QuoteItem { quantity: 40, ..QuoteItem::new("pump", "Pool pump") });
    assert_eq!(cart.items()[0].quantity, 1);
}

#[test]
fn test_non_positive_quantity_removes_item() {
    let mut cart = filled_cart();
    cart.update_quantity("skimmer", 0);
    assert_eq!(cart.len(), 1);
    cart.update_quantity("chlorine-tabs", -4);
    assert!(cart.is_empty());
}

#[test]
fn test_update_quantity_of_unknown_item_is_ignored() {
    let mut cart = filled_cart();
    cart.update_quantity("heater", 5);
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total_quantity(), 4);
}

#[test]
fn test_items_keep_insertion_order() {
    let mut cart = filled_cart();
    cart.add_item(QuoteItem::new("test-kit", "Test kit"));
    let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["chlorine-tabs", "skimmer", "test-kit"]);

    cart.remove_item("skimmer");
    cart.clear();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_submit_without_session_writes_nothing() {
    init_tracing();
    let (memory, client) = memory_client();
    let service = quote_service(client, None);
    let mut cart = filled_cart();

    let result = cart.submit_quote(None, &contact(), &service).await;

    assert!(matches!(result, Err(ServiceError::Unauthenticated(_))));
    assert!(memory.rows("quote_requests").is_empty());
    assert_eq!(cart.len(), 2);
}

#[tokio::test]
async fn test_submit_empty_cart_is_rejected() {
    let (memory, client) = memory_client();
    let service = quote_service(client, None);
    let mut cart = QuoteCart::new();

    let result = cart.submit_quote(Some(&session()), &contact(), &service).await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    assert!(memory.rows("quote_requests").is_empty());
}

#[tokio::test]
async fn test_successful_submit_stores_quote_and_clears_cart() {
    init_tracing();
    let (memory, client) = memory_client();
    let mailer = Arc::new(RecordingMailer::default());
    let service = quote_service(client, Some(mailer.clone()));
    let session = session();
    let mut cart = filled_cart();

    let quote = cart.submit_quote(Some(&session), &contact(), &service).await.expect("submit failed");
    service.background.drain().await;

    assert!(cart.is_empty());
    assert_eq!(quote.user_id, session.user.id);
    assert_eq!(quote.items.len(), 2);
    assert_eq!(quote.items[0].quantity, 3);

    let rows = memory.rows("quote_requests");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "pending");

    let notifications = memory.rows("notifications");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "quote");
    assert_eq!(notifications[0]["reference_id"], quote.id.to_string());
    assert_eq!(notifications[0]["is_read"], false);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "admin@example.com");
    assert_eq!(sent[1].to, "dana@example.com");

    let profiles = memory.rows("profiles");
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["full_name"], "Dana Reef");
}

#[tokio::test]
async fn test_primary_write_failure_leaves_cart_untouched() {
    let (memory, client) = memory_client();
    let service = quote_service(client, None);
    memory.fail_table("quote_requests");
    let mut cart = filled_cart();

    let result = cart.submit_quote(Some(&session()), &contact(), &service).await;
    service.background.drain().await;

    assert!(result.is_err());
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total_quantity(), 4);
    assert!(memory.rows("notifications").is_empty());
}

#[tokio::test]
async fn test_side_effect_failures_do_not_fail_submit() {
    init_tracing();
    let memory = Arc::new(InMemoryTableClient::new());
    let client: Arc<dyn TableClient> = memory.clone();
    memory.fail_table("notifications");
    memory.fail_table("profiles");
    let service = quote_service(client, Some(Arc::new(RecordingMailer::failing())));
    let mut cart = filled_cart();

    let quote = cart.submit_quote(Some(&session()), &contact(), &service).await;
    service.background.drain().await;

    assert!(quote.is_ok());
    assert!(cart.is_empty());
    assert_eq!(memory.rows("quote_requests").len(), 1);
    assert!(memory.rows("notifications").is_empty());
    assert_eq!(service.background.pending(), 0);
}

#[tokio::test]
async fn test_empty_contact_skips_profile_update() {
    let (memory, client) = memory_client();
    let service = quote_service(client, None);
    let mut cart = filled_cart();

    cart.submit_quote(Some(&session()), &ContactDetails::default(), &service).await.unwrap();
    service.background.drain().await;

    assert!(memory.rows("profiles").is_empty());
    assert_eq!(memory.rows("notifications").len(), 1);
}

#[tokio::test]
async fn test_unknown_customer_address_only_mails_admin() {
    let (memory, client) = memory_client();
    let mailer = Arc::new(RecordingMailer::default());
    let service = quote_service(client, Some(mailer.clone()));
    let session = Session {
        user: AuthUser { id: Uuid::new_v4(), email: String::new() },
        ..session()
    };
    let mut cart = filled_cart();

    let contact = ContactDetails { email: Some("  ".to_string()), ..ContactDetails::default() };
    cart.submit_quote(Some(&session), &contact, &service).await.unwrap();
    service.background.drain().await;

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "admin@example.com");
    assert_eq!(sent[0].subject, "New quote request from a customer");
    assert_eq!(memory.rows("quote_requests").len(), 1);
}
