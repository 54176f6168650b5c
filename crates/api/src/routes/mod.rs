pub mod annotation;
pub mod document;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /documents/upload                POST   upload (multipart)
/// /documents                       GET    list (?skip, ?limit)
/// /documents/{id}                  GET    metadata, DELETE delete (cascades)
/// /documents/{id}/file             GET    file content (converted PDF if any)
/// /documents/{id}/annotations      GET    list (?annotation_type, ?page)
///
/// /annotations                     POST   create (tagged payload)
/// /annotations/{id}                GET    fetch, PUT update, DELETE delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Document upload, retrieval, and the nested annotation listing.
        .nest("/documents", document::router())
        // Annotation CRUD (create carries document_id in the payload).
        .nest("/annotations", annotation::router())
}
