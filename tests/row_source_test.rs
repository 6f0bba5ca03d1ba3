//! Row sources fetched over HTTP from a local server.

mod common;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use common::TestClient;
use ledger_graphs::error::AppError;
use ledger_graphs::server::serve;
use ledger_graphs::services::row_source::{load_tree, RowSource};

/// Starts a server on an OS-assigned port and returns its base URL.
async fn spawn_rows_server() -> String {
    let app = Router::new()
        .route("/rows.csv", get(|| async { common::SAMPLE_CSV }))
        .route("/query", post(|body: String| async move { body }))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let (port, _handle) = serve(app, "127.0.0.1", 0).await.unwrap();
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_url_source_get() {
    let base = spawn_rows_server().await;
    let source = RowSource::parse(&format!("{}/rows.csv", base));

    let content = source.fetch().await.unwrap();
    assert_eq!(content, common::SAMPLE_CSV.as_bytes());

    let tree = load_tree(&source, ':').await.unwrap();
    assert_eq!(tree.rows().len(), 4);
    assert!(tree.find(&["food", "restaurant"]).is_some());
}

#[tokio::test]
async fn test_url_source_posts_body() {
    let base = spawn_rows_server().await;
    let rows = "date,flag,account,number\n2024-02-01,*,Income:Salary,-3000\n";
    let source = RowSource::parse(&format!("{}/query", base)).with_body(rows);

    let content = source.fetch().await.unwrap();
    assert_eq!(content, rows.as_bytes());

    let tree = load_tree(&source, ':').await.unwrap();
    assert!(tree.find(&["Income", "Salary"]).is_some());
}

#[tokio::test]
async fn test_url_source_error_status_is_rejected() {
    let base = spawn_rows_server().await;
    let source = RowSource::parse(&format!("{}/broken", base));

    let result = source.fetch().await;
    match result {
        Err(AppError::Source(message)) => assert!(message.contains("500"), "{}", message),
        other => panic!("expected a source error, got {:?}", other),
    }
    assert!(matches!(
        load_tree(&source, ':').await,
        Err(AppError::Source(_))
    ));
}

#[tokio::test]
async fn test_url_source_unreachable() {
    // Bind and drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let source = RowSource::parse(&format!("http://127.0.0.1:{}/rows.csv", port));
    assert!(matches!(source.fetch().await, Err(AppError::Http(_))));
}

#[tokio::test]
async fn test_input_endpoint_proxies_url_source() {
    let base = spawn_rows_server().await;
    let source = RowSource::parse(&format!("{}/rows.csv", base));
    let client = TestClient::with_config(TestClient::config(Some(source)), common::SAMPLE_CSV);

    let (status, body) = client.get("/graphs/input.csv").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, common::SAMPLE_CSV);
}

#[tokio::test]
async fn test_input_endpoint_reports_failed_source() {
    let base = spawn_rows_server().await;
    let source = RowSource::parse(&format!("{}/broken", base));
    let client = TestClient::with_config(TestClient::config(Some(source)), common::SAMPLE_CSV);

    let (status, _) = client.get("/graphs/input.csv").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
