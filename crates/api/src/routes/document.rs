//! Route definitions for the `/documents` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{annotation, document};
use crate::state::AppState;

/// Document routes, mounted under `/documents`.
///
/// ```text
/// POST   /upload                upload_document (multipart)
/// GET    /                      list_documents (?skip, ?limit)
/// GET    /{id}                  get_document
/// DELETE /{id}                  delete_document
/// GET    /{id}/file             get_document_file
/// GET    /{id}/annotations      list_annotations (?annotation_type, ?page)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(document::upload_document))
        .route("/", get(document::list_documents))
        .route(
            "/{id}",
            get(document::get_document).delete(document::delete_document),
        )
        .route("/{id}/file", get(document::get_document_file))
        .route("/{id}/annotations", get(annotation::list_annotations))
}
