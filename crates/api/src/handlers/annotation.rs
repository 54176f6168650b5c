//! Handlers for annotation CRUD.
//!
//! Annotations are created against a document and come in two variants
//! (page/percentage vs. pixel placement); updates are type-aware and reject
//! fields belonging to the other variant outright.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use pagemark_core::annotation::{validate_content, AnnotationPatch, AnnotationType, CreateAnnotation};
use pagemark_core::error::CoreError;
use pagemark_core::types::DbId;
use pagemark_db::models::annotation::Annotation;
use pagemark_db::repositories::AnnotationRepo;

use crate::error::AppResult;
use crate::handlers::document::ensure_document_exists;
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Query filters and response types
   -------------------------------------------------------------------------- */

/// Optional query filters for listing a document's annotations.
#[derive(Debug, Deserialize)]
pub struct AnnotationListFilters {
    pub annotation_type: Option<String>,
    pub page: Option<i32>,
}

/// Response payload for a document's annotation list.
#[derive(Debug, Serialize)]
pub struct AnnotationListResponse {
    pub annotations: Vec<Annotation>,
    pub total: usize,
    /// The page filter echoed back, if one was applied.
    pub page: Option<i32>,
    pub document_id: DbId,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /annotations
///
/// Create a new annotation. The payload is discriminated by
/// `annotation_type`; content is stored trimmed and percentages are
/// normalized to two decimals.
pub async fn create_annotation(
    State(state): State<AppState>,
    Json(input): Json<CreateAnnotation>,
) -> AppResult<impl IntoResponse> {
    ensure_document_exists(&state.pool, input.document_id).await?;

    let input = CreateAnnotation {
        document_id: input.document_id,
        content: validate_content(&input.content)?,
        placement: input.placement.validated()?,
    };

    let annotation = AnnotationRepo::create(&state.pool, &input).await?;

    tracing::info!(
        annotation_id = annotation.id,
        document_id = annotation.document_id,
        annotation_type = %annotation.annotation_type,
        "Annotation created"
    );

    Ok((StatusCode::CREATED, Json(annotation)))
}

/// GET /documents/{id}/annotations
///
/// List a document's annotations in creation order, with optional
/// annotation_type and page filters. A page filter on image annotations
/// yields the natural empty result.
pub async fn list_annotations(
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
    Query(filters): Query<AnnotationListFilters>,
) -> AppResult<impl IntoResponse> {
    ensure_document_exists(&state.pool, document_id).await?;

    let annotation_type = match filters.annotation_type.as_deref() {
        Some(value) => Some(AnnotationType::from_str(value)?),
        None => None,
    };

    let annotations =
        AnnotationRepo::list_by_document(&state.pool, document_id, annotation_type, filters.page)
            .await?;

    Ok(Json(AnnotationListResponse {
        total: annotations.len(),
        annotations,
        page: filters.page,
        document_id,
    }))
}

/// GET /annotations/{id}
pub async fn get_annotation(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let annotation = AnnotationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Annotation",
            id,
        })?;
    Ok(Json(annotation))
}

/// PUT /annotations/{id}
///
/// Apply a sparse patch. The whole update is rejected if it touches fields
/// of the other variant; nothing is applied on any failure.
pub async fn update_annotation(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<AnnotationPatch>,
) -> AppResult<impl IntoResponse> {
    let existing = AnnotationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Annotation",
            id,
        })?;

    // Reassembling the placement also verifies the stored row shape.
    let kind = existing.placement()?.kind();
    patch.check_against(kind)?;
    let patch = patch.validated()?;

    let annotation = AnnotationRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Annotation",
            id,
        })?;

    tracing::info!(annotation_id = id, "Annotation updated");

    Ok(Json(annotation))
}

/// DELETE /annotations/{id}
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = AnnotationRepo::delete(&state.pool, id).await?;

    if !deleted {
        return Err(CoreError::NotFound {
            entity: "Annotation",
            id,
        }
        .into());
    }

    tracing::info!(annotation_id = id, "Annotation deleted");

    Ok(StatusCode::NO_CONTENT)
}
