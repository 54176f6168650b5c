//! HTTP-level integration tests for the `/documents` endpoints: upload,
//! metadata, file streaming, listing, and cascade deletion.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_document, delete, get, post_json, post_multipart};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_pdf_creates_document(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_multipart(
        app,
        "/api/v1/documents/upload",
        "report.pdf",
        "application/pdf",
        b"%PDF-1.4 minimal",
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let data = body_json(response).await;
    assert_eq!(data["original_filename"], "report.pdf");
    assert_eq!(data["mime_type"], "application/pdf");
    assert_eq!(data["file_size"], 16);
    assert!(data["converted_path"].is_null());
    // The stored name is unique, not the client's name.
    assert_ne!(data["filename"], "report.pdf");
    assert!(data["filename"].as_str().unwrap().ends_with(".pdf"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_png_creates_document(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_multipart(
        app,
        "/api/v1/documents/upload",
        "photo.png",
        "image/png",
        b"\x89PNG fake image bytes",
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let data = body_json(response).await;
    assert_eq!(data["mime_type"], "image/png");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_disallowed_mime_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_multipart(
        app,
        "/api/v1/documents/upload",
        "page.html",
        "text/html",
        b"<html></html>",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_without_file_field_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    // A JSON body is not a multipart form at all.
    let response = post_json(app, "/api/v1/documents/upload", json!({})).await;
    assert!(response.status().is_client_error());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_empty_filename_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_multipart(
        app,
        "/api/v1/documents/upload",
        " ",
        "application/pdf",
        b"%PDF-1.4",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_document_metadata(pool: PgPool) {
    let app = common::build_test_app(pool);
    let document_id = create_test_document(&app).await;

    let response = get(app, &format!("/api/v1/documents/{document_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await;
    assert_eq!(data["id"], document_id);
    assert_eq!(data["original_filename"], "fixture.pdf");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_missing_document_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/documents/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_document_file_round_trips_bytes(pool: PgPool) {
    let app = common::build_test_app(pool);

    let content = b"%PDF-1.4 file body for round trip";
    let response = post_multipart(
        app.clone(),
        "/api/v1/documents/upload",
        "fetchme.pdf",
        "application/pdf",
        content,
    )
    .await;
    let document_id = body_json(response).await["id"].as_i64().unwrap();

    let response = get(app, &format!("/api/v1/documents/{document_id}/file")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("inline"));
    assert!(disposition.contains("fetchme.pdf"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], content);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_file_for_missing_document_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/documents/999999/file").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_documents_newest_first(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut ids = Vec::new();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        let response = post_multipart(
            app.clone(),
            "/api/v1/documents/upload",
            name,
            "application/pdf",
            b"%PDF-1.4",
        )
        .await;
        ids.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let response = get(app.clone(), "/api/v1/documents").await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await;
    let listed: Vec<i64> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);

    // Paging.
    let response = get(app, "/api/v1/documents?skip=1&limit=1").await;
    let data = body_json(response).await;
    let listed: Vec<i64> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[1]]);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_document_removes_its_annotations(pool: PgPool) {
    let app = common::build_test_app(pool);
    let document_id = create_test_document(&app).await;

    // Attach a few annotations.
    let mut annotation_ids = Vec::new();
    for i in 0..3 {
        let response = post_json(
            app.clone(),
            "/api/v1/annotations",
            json!({
                "annotation_type": "document",
                "document_id": document_id,
                "page": 1,
                "x_percent": 10.0 + f64::from(i),
                "y_percent": 10.0,
                "content": format!("note {i}")
            }),
        )
        .await;
        annotation_ids.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let response = delete(app.clone(), &format!("/api/v1/documents/{document_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The document and every annotation referencing it are gone.
    let response = get(app.clone(), &format!("/api/v1/documents/{document_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for id in annotation_ids {
        let response = get(app.clone(), &format!("/api/v1/annotations/{id}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_missing_document_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = delete(app, "/api/v1/documents/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
