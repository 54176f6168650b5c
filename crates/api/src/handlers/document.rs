//! Handlers for document upload, retrieval, and deletion.
//!
//! Uploads land on local disk under a uuid-derived name; DOC/DOCX uploads
//! additionally spawn a detached PDF conversion task whose outcome never
//! affects the upload itself.

use std::path::PathBuf;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use pagemark_core::convert;
use pagemark_core::document::{is_convertible_mime, stored_filename, validate_original_filename};
use pagemark_core::error::CoreError;
use pagemark_core::types::DbId;
use pagemark_db::models::document::CreateDocument;
use pagemark_db::repositories::DocumentRepo;
use pagemark_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Cap on documents returned per list request.
const MAX_LIST_LIMIT: i64 = 100;

/// Return `NotFound` if the document does not exist.
pub(crate) async fn ensure_document_exists(pool: &DbPool, id: DbId) -> Result<(), AppError> {
    DocumentRepo::find_by_id(pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Document",
                id,
            })
        })
}

/// Paging parameters for document listing.
#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /documents/upload
///
/// Accepts a multipart form with a required `file` field. The file is
/// checked against the upload policy, stored under a unique name, and a
/// document record is created. DOC/DOCX files get a background PDF
/// conversion; the upload succeeds whether or not that conversion does.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((filename, mime_type, data.to_vec()));
        }
    }

    let (original_filename, mime_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let policy = &state.config.upload.policy;
    policy.check_mime(&mime_type)?;
    if policy.exceeds_size(data.len() as u64) {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} bytes",
            policy.max_file_size_bytes
        )));
    }
    validate_original_filename(&original_filename)?;

    let filename = stored_filename(&original_filename);
    let upload_dir = &state.config.upload.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let file_path = upload_dir.join(&filename);
    tokio::fs::write(&file_path, &data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let input = CreateDocument {
        filename,
        original_filename: original_filename.clone(),
        mime_type: mime_type.clone(),
        file_size: data.len() as i64,
        file_path: file_path.to_string_lossy().to_string(),
    };

    let document = match DocumentRepo::create(&state.pool, &input).await {
        Ok(document) => document,
        Err(err) => {
            // Don't leave the stored file orphaned when the insert fails.
            if let Err(cleanup) = tokio::fs::remove_file(&file_path).await {
                tracing::warn!(
                    path = %file_path.display(),
                    error = %cleanup,
                    "Failed to remove stored file after insert error"
                );
            }
            return Err(err.into());
        }
    };

    tracing::info!(
        document_id = document.id,
        original_filename = %document.original_filename,
        mime_type = %document.mime_type,
        file_size = document.file_size,
        "Document uploaded"
    );

    if is_convertible_mime(&mime_type) {
        spawn_conversion(state.clone(), document.id, file_path, original_filename);
    }

    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Document",
            id,
        })?;
    Ok(Json(document))
}

/// GET /documents/{id}/file
///
/// Serve the document's file content: the converted PDF when one exists,
/// otherwise the original upload.
pub async fn get_document_file(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Document",
            id,
        })?;

    let (path, content_type, filename) = match document.converted_path {
        Some(ref converted) => {
            let stem = std::path::Path::new(&document.original_filename)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            (
                PathBuf::from(converted),
                "application/pdf".to_string(),
                format!("{stem}.pdf"),
            )
        }
        None => (
            PathBuf::from(&document.file_path),
            document.mime_type.clone(),
            document.original_filename.clone(),
        ),
    };

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::NotFound {
                entity: "DocumentFile",
                id,
            }
            .into());
        }
        Err(err) => return Err(AppError::InternalError(err.to_string())),
    };

    if data.is_empty() {
        return Err(AppError::InternalError(format!(
            "stored file at {} is empty",
            path.display()
        )));
    }
    // Guard against serving a half-written or corrupt conversion result.
    if content_type == "application/pdf" && !data.starts_with(b"%PDF-") {
        return Err(AppError::InternalError(format!(
            "stored file at {} is not a valid PDF",
            path.display()
        )));
    }

    let headers = [
        (header::CONTENT_TYPE, content_type),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        ),
        (
            header::CACHE_CONTROL,
            "no-store, must-revalidate".to_string(),
        ),
    ];

    Ok((headers, data))
}

/// GET /documents
///
/// List documents, newest first. `limit` is capped at 100.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentListQuery>,
) -> AppResult<impl IntoResponse> {
    let skip = query.skip.max(0);
    let limit = query.limit.unwrap_or(MAX_LIST_LIMIT).clamp(0, MAX_LIST_LIMIT);

    let documents = DocumentRepo::list(&state.pool, skip, limit).await?;
    Ok(Json(documents))
}

/// DELETE /documents/{id}
///
/// Remove the document's files from disk (best-effort) and delete the row;
/// annotations cascade at the storage level.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Document",
            id,
        })?;

    let mut paths = vec![document.file_path.clone()];
    if let Some(ref converted) = document.converted_path {
        paths.push(converted.clone());
    }
    for path in paths {
        if let Err(err) = tokio::fs::remove_file(&path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path, error = %err, "Failed to remove document file");
            }
        }
    }

    let deleted = DocumentRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "Document",
            id,
        }
        .into());
    }

    tracing::info!(document_id = id, "Document deleted");

    Ok(StatusCode::NO_CONTENT)
}

/* --------------------------------------------------------------------------
   Background conversion
   -------------------------------------------------------------------------- */

/// Convert an office document to PDF in a detached task.
///
/// The upload has already succeeded by the time this runs; any failure here
/// only leaves the document without a converted path.
fn spawn_conversion(
    state: AppState,
    document_id: DbId,
    input_path: PathBuf,
    original_filename: String,
) {
    tokio::spawn(async move {
        let timeout = std::time::Duration::from_secs(state.config.upload.conversion_timeout_secs);
        let converted_dir = state.config.upload.converted_dir();
        let scratch_dir = converted_dir.join(format!("scratch_{document_id}"));

        let outcome = match convert::convert_to_pdf(&input_path, &scratch_dir, timeout).await {
            Ok(produced) => {
                let stem = std::path::Path::new(&original_filename)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                let final_path = converted_dir.join(format!("{stem}_{document_id}.pdf"));
                record_converted(&state, document_id, &produced, &final_path).await
            }
            Err(err) => Err(err.to_string()),
        };

        if let Err(err) = tokio::fs::remove_dir_all(&scratch_dir).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %scratch_dir.display(),
                    error = %err,
                    "Failed to clean up conversion scratch directory"
                );
            }
        }

        match outcome {
            Ok(path) => {
                tracing::info!(document_id, converted_path = %path, "Document converted to PDF");
            }
            Err(err) => {
                tracing::warn!(
                    document_id,
                    error = %err,
                    "Document conversion failed; the original file remains available"
                );
            }
        }
    });
}

/// Move the produced PDF to its final location and record it on the row.
async fn record_converted(
    state: &AppState,
    document_id: DbId,
    produced: &std::path::Path,
    final_path: &std::path::Path,
) -> Result<String, String> {
    tokio::fs::rename(produced, final_path)
        .await
        .map_err(|e| e.to_string())?;

    let path = final_path.to_string_lossy().to_string();
    DocumentRepo::set_converted_path(&state.pool, document_id, &path)
        .await
        .map_err(|e| e.to_string())?;
    Ok(path)
}
