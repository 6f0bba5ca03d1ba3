//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the router directly with `oneshot` requests against a
//! tree built from an in-memory CSV string.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ledger_graphs::config::Config;
use ledger_graphs::handlers;
use ledger_graphs::services::hierarchy::SegmentTree;
use ledger_graphs::services::row_parser::parse_rows;
use ledger_graphs::services::row_source::RowSource;
use ledger_graphs::state::AppState;
use tower::ServiceExt;

pub const SAMPLE_CSV: &str = "date,flag,account,number\n\
2024-01-01,*,food:grocery,10\n\
2024-01-03,*,food:grocery,5\n\
2024-01-02,*,food:restaurant,7\n\
2024-01-05,*,rent,1\n";

pub struct TestClient {
    pub state: AppState,
}

impl TestClient {
    /// A client with `SAMPLE_CSV` loaded and no row source.
    pub fn new() -> Self {
        Self::with_csv(SAMPLE_CSV)
    }

    pub fn with_csv(csv: &str) -> Self {
        Self::with_config(Self::config(None), csv)
    }

    pub fn with_config(config: Config, csv: &str) -> Self {
        let rows = parse_rows(csv.as_bytes(), config.account_delimiter)
            .expect("Failed to parse test rows");
        let state = AppState::new(config, SegmentTree::build(rows));
        Self { state }
    }

    pub fn config(source: Option<RowSource>) -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 0,
            source,
            account_delimiter: ':',
            days_per_sample: 2,
            ..Config::default()
        }
    }

    pub fn router(&self) -> Router {
        handlers::routes().with_state(self.state.clone())
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with a raw body and return status and body.
    pub async fn post(&self, uri: &str, body: &str) -> (StatusCode, String) {
        self.send(post_request(uri, "text/csv", body.to_string()))
            .await
    }

    /// POST a single file as `multipart/form-data`.
    pub async fn post_file(
        &self,
        uri: &str,
        field: &str,
        file_name: &str,
        content: &str,
    ) -> (StatusCode, String) {
        let (content_type, body) = multipart_body(field, file_name, content);
        self.send(post_request(uri, &content_type, body)).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        send(self.router(), request).await
    }

    /// Get JSON from an endpoint and parse it.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        uri: &str,
    ) -> (StatusCode, Option<T>) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body).ok();
        (status, parsed)
    }
}

pub fn post_request(uri: &str, content_type: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .unwrap()
}

/// Drive `router` with one request and return status and body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).to_string())
}

/// Content type and body of a form with one file field.
pub fn multipart_body(field: &str, file_name: &str, content: &str) -> (String, String) {
    let boundary = "ledger-graphs-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    (format!("multipart/form-data; boundary={}", boundary), body)
}

/// Writes an executable stand-in for `bean-query` into `dir`. It checks for
/// `-f csv` and prints the ledger file unchanged, so a "ledger" holding CSV
/// rows comes back as the query result.
#[cfg(unix)]
pub fn fake_bean_query(dir: &std::path::Path) -> String {
    write_script(
        dir,
        "bean-query",
        "#!/bin/sh\n[ \"$1\" = \"-f\" ] && [ \"$2\" = \"csv\" ] || exit 2\ncat \"$3\"\n",
    )
}

/// A `bean-query` stand-in that always fails.
#[cfg(unix)]
pub fn failing_bean_query(dir: &std::path::Path) -> String {
    write_script(
        dir,
        "bean-query-broken",
        "#!/bin/sh\necho 'syntax error in ledger' >&2\nexit 1\n",
    )
}

#[cfg(unix)]
fn write_script(dir: &std::path::Path, name: &str, script: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
