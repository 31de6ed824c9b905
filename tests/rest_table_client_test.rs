use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_RANGE, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use poolcare_backend::config::BackendConfig;
use poolcare_backend::repository::notification_repo::NotificationRepository;
use poolcare_backend::repository::repository_error::RepositoryError;
use poolcare_backend::repository::rest_table_client::RestTableClient;
use poolcare_backend::repository::table_client::{Filter, TableClient, TableQuery};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// One request as the stub saw it.
#[derive(Debug, Clone)]
struct Seen {
    method: String,
    table: String,
    query: Vec<(String, String)>,
    prefer: Option<String>,
    apikey: Option<String>,
    authorization: Option<String>,
    body: String,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn table_endpoint(
    State(log): State<Log>,
    method: Method,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let prefer = header("prefer");
    log.lock().unwrap().push(Seen {
        method: method.to_string(),
        table: table.clone(),
        query,
        prefer: prefer.clone(),
        apikey: header("apikey"),
        authorization: header("authorization"),
        body: body.clone(),
    });
    let representation = prefer.as_deref() == Some("return=representation");
    let exact_count = prefer.as_deref() == Some("count=exact");

    match (method.as_str(), table.as_str()) {
        ("HEAD", "notifications") if exact_count => (StatusCode::OK, [(CONTENT_RANGE, "0-2/3")]).into_response(),
        ("HEAD", "products") if exact_count => (StatusCode::OK, [(CONTENT_RANGE, "*/0")]).into_response(),
        ("GET", "products") => reply(StatusCode::OK, json!([{ "id": "1", "name": "Pump" }])),
        ("GET", "empty") => StatusCode::OK.into_response(),
        ("GET", "missing") => reply(StatusCode::NOT_FOUND, json!({ "message": "relation does not exist" })),
        ("GET", "locked") => reply(StatusCode::FORBIDDEN, json!({ "message": "permission denied" })),
        ("GET", "broken") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        ("POST", "products") if representation => {
            let mut row: Value = serde_json::from_str(&body).unwrap();
            row["id"] = json!("new-id");
            reply(StatusCode::CREATED, json!([row]))
        }
        ("POST", "single") if representation => reply(StatusCode::CREATED, json!({ "id": "s1" })),
        ("POST", "silent") => reply(StatusCode::CREATED, json!([])),
        ("POST", "dupes") => {
            reply(StatusCode::CONFLICT, json!({ "message": "duplicate key value violates unique constraint" }))
        }
        ("PATCH", "products") if representation => reply(StatusCode::OK, json!([{ "id": "7", "name": "Renamed" }])),
        ("DELETE", "products") if representation => reply(StatusCode::OK, json!([{ "id": "7" }, { "id": "8" }])),
        _ => (StatusCode::IM_A_TEAPOT, "unexpected request").into_response(),
    }
}

async fn spawn_stub() -> (SocketAddr, Log) {
    let log: Log = Arc::default();
    let app = Router::new().route("/rest/v1/{table}", any(table_endpoint)).with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, log)
}

fn client_for(addr: SocketAddr) -> RestTableClient {
    let config = BackendConfig {
        url: format!("http://{}", addr),
        service_role_key: Some("service-key".to_string()),
        ..BackendConfig::from_test_env()
    };
    RestTableClient::new(&config).unwrap()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn last(log: &Log) -> Seen {
    log.lock().unwrap().last().cloned().expect("no request reached the stub")
}

#[tokio::test]
async fn test_select_encodes_query_and_headers() {
    let (addr, log) = spawn_stub().await;
    let client = client_for(addr);
    let query = TableQuery::new()
        .select("id,name")
        .eq("category_id", "c1")
        .eq("is_active", true)
        .neq("assigned_to", Value::Null)
        .asc("display_order")
        .limit(5);

    let rows = client.select("products", &query).await.unwrap();

    assert_eq!(rows, vec![json!({ "id": "1", "name": "Pump" })]);
    let seen = last(&log);
    assert_eq!(seen.method, "GET");
    assert_eq!(
        seen.query,
        pairs(&[
            ("select", "id,name"),
            ("category_id", "eq.c1"),
            ("is_active", "eq.true"),
            ("assigned_to", "not.is.null"),
            ("order", "display_order.asc"),
            ("limit", "5"),
        ])
    );
    assert_eq!(seen.apikey.as_deref(), Some("test-anon-key"));
    assert_eq!(seen.authorization.as_deref(), Some("Bearer service-key"));
}

#[tokio::test]
async fn test_empty_body_reads_as_no_rows() {
    let (addr, _) = spawn_stub().await;
    let rows = client_for(addr).select("empty", &TableQuery::new()).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_insert_asks_for_representation() {
    let (addr, log) = spawn_stub().await;
    let client = client_for(addr);

    let stored = client.insert("products", json!({ "name": "Heater" })).await.unwrap();

    assert_eq!(stored, json!({ "name": "Heater", "id": "new-id" }));
    let seen = last(&log);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.prefer.as_deref(), Some("return=representation"));
    assert_eq!(serde_json::from_str::<Value>(&seen.body).unwrap(), json!({ "name": "Heater" }));
}

#[tokio::test]
async fn test_insert_accepts_single_object_reply() {
    let (addr, _) = spawn_stub().await;
    let stored = client_for(addr).insert("single", json!({})).await.unwrap();
    assert_eq!(stored["id"], "s1");
}

#[tokio::test]
async fn test_insert_without_returned_row_is_an_error() {
    let (addr, _) = spawn_stub().await;
    let result = client_for(addr).insert("silent", json!({ "name": "x" })).await;
    assert!(matches!(result, Err(RepositoryError::DatabaseError(msg)) if msg.contains("returned no row")));
}

#[tokio::test]
async fn test_update_sends_filters_and_patch() {
    let (addr, log) = spawn_stub().await;
    let client = client_for(addr);

    let updated = client
        .update("products", &[Filter::eq("id", "7")], json!({ "name": "Renamed" }))
        .await
        .unwrap();

    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["name"], "Renamed");
    let seen = last(&log);
    assert_eq!(seen.method, "PATCH");
    assert_eq!(seen.query, pairs(&[("id", "eq.7")]));
    assert_eq!(seen.prefer.as_deref(), Some("return=representation"));
}

#[tokio::test]
async fn test_unfiltered_writes_never_leave_the_client() {
    let (addr, log) = spawn_stub().await;
    let client = client_for(addr);

    let update = client.update("products", &[], json!({ "name": "all" })).await;
    let delete = client.delete("products", &[]).await;

    assert!(matches!(update, Err(RepositoryError::ValidationError(_))));
    assert!(matches!(delete, Err(RepositoryError::ValidationError(_))));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_counts_returned_rows() {
    let (addr, log) = spawn_stub().await;
    let removed = client_for(addr).delete("products", &[Filter::eq("category_id", "c1")]).await.unwrap();

    assert_eq!(removed, 2);
    let seen = last(&log);
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.query, pairs(&[("category_id", "eq.c1")]));
}

#[tokio::test]
async fn test_error_statuses_map_to_repository_errors() {
    let (addr, _) = spawn_stub().await;
    let client = client_for(addr);

    let missing = client.select("missing", &TableQuery::new()).await;
    assert!(matches!(missing, Err(RepositoryError::NotFound(msg)) if msg.contains("relation does not exist")));

    let duplicate = client.insert("dupes", json!({ "slug": "pumps" })).await;
    assert!(matches!(duplicate, Err(RepositoryError::AlreadyExists(_))));

    let locked = client.select("locked", &TableQuery::new()).await;
    assert!(matches!(locked, Err(RepositoryError::PermissionDenied(_))));

    let broken = client.select("broken", &TableQuery::new()).await;
    assert_eq!(broken.unwrap_err().to_string(), "Database Error: HTTP 500: boom");
}

#[tokio::test]
async fn test_count_reads_content_range() {
    let (addr, log) = spawn_stub().await;
    let client: Arc<dyn TableClient> = Arc::new(client_for(addr));

    assert_eq!(client.count("products", &[]).await.unwrap(), 0);

    let unread = NotificationRepository::new(client).unread_count().await.unwrap();
    assert_eq!(unread, 3);
    let seen = last(&log);
    assert_eq!(seen.method, "HEAD");
    assert_eq!(seen.prefer.as_deref(), Some("count=exact"));
    assert_eq!(seen.query, pairs(&[("select", "*"), ("is_read", "eq.false")]));
}

#[tokio::test]
async fn test_unreachable_store_is_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client_for(addr).select("products", &TableQuery::new()).await;
    assert!(matches!(result, Err(RepositoryError::ConnectionError(_))));
}
