//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the application router through the same [`build_app_router`] the
//! binary uses, so tests exercise the production middleware stack (CORS,
//! request ID, timeout, tracing, panic recovery). Requests are driven with
//! `tower::ServiceExt::oneshot`; clone the router for each request.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use pagemark_api::config::{ServerConfig, UploadConfig};
use pagemark_api::router::build_app_router;
use pagemark_api::state::AppState;
use pagemark_core::document::UploadPolicy;

/// Multipart boundary used by [`post_multipart`].
pub const TEST_BOUNDARY: &str = "pagemark-test-boundary";

/// Build a test `ServerConfig` with safe defaults and a unique temporary
/// upload directory per test.
pub fn test_config() -> ServerConfig {
    let upload_dir = std::env::temp_dir()
        .join("pagemark-tests")
        .join(uuid::Uuid::new_v4().to_string());

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload: UploadConfig {
            upload_dir,
            conversion_timeout_secs: 5,
            policy: UploadPolicy::default(),
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a PUT request with a JSON body.
pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a multipart POST with a single `file` field.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Response {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{TEST_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{TEST_BOUNDARY}--\r\n").as_bytes());

    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={TEST_BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Upload a small PDF and return the new document's id.
pub async fn create_test_document(app: &Router) -> i64 {
    let response = post_multipart(
        app.clone(),
        "/api/v1/documents/upload",
        "fixture.pdf",
        "application/pdf",
        b"%PDF-1.4 test fixture",
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let json = body_json(response).await;
    json["id"].as_i64().expect("upload response should have an id")
}
