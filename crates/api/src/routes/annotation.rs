//! Route definitions for the `/annotations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

/// Annotation routes, mounted under `/annotations`.
///
/// ```text
/// POST   /           create_annotation
/// GET    /{id}       get_annotation
/// PUT    /{id}       update_annotation
/// DELETE /{id}       delete_annotation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(annotation::create_annotation))
        .route(
            "/{id}",
            get(annotation::get_annotation)
                .put(annotation::update_annotation)
                .delete(annotation::delete_annotation),
        )
}
