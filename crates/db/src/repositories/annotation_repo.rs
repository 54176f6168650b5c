//! Repository for the `annotations` table.

use pagemark_core::annotation::{AnnotationPatch, AnnotationType, CreateAnnotation, Placement};
use pagemark_core::types::DbId;
use sqlx::PgPool;

use crate::models::annotation::Annotation;

/// Column list for annotations queries.
const COLUMNS: &str = "id, document_id, annotation_type, page, x_percent, y_percent, \
    x_pixel, y_pixel, color, content, created_at, updated_at";

/// Provides CRUD operations for annotations.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Insert a new annotation, decomposing the placement variant into the
    /// flat column set. Expects already-validated input.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAnnotation,
    ) -> Result<Annotation, sqlx::Error> {
        let (page, x_percent, y_percent, x_pixel, y_pixel, color) = match &input.placement {
            Placement::Document {
                page,
                x_percent,
                y_percent,
            } => (Some(*page), Some(*x_percent), Some(*y_percent), None, None, None),
            Placement::Image {
                x_pixel,
                y_pixel,
                color,
            } => (None, None, None, Some(*x_pixel), Some(*y_pixel), color.clone()),
        };

        let query = format!(
            "INSERT INTO annotations
                (document_id, annotation_type, page, x_percent, y_percent,
                 x_pixel, y_pixel, color, content)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(input.document_id)
            .bind(input.placement.kind().as_str())
            .bind(page)
            .bind(x_percent)
            .bind(y_percent)
            .bind(x_pixel)
            .bind(y_pixel)
            .bind(color)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// Find an annotation by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List annotations for a document in creation order (ties broken by id,
    /// so the order is stable), with optional type and page filters.
    pub async fn list_by_document(
        pool: &PgPool,
        document_id: DbId,
        annotation_type: Option<AnnotationType>,
        page: Option<i32>,
    ) -> Result<Vec<Annotation>, sqlx::Error> {
        match (annotation_type, page) {
            (Some(kind), Some(page)) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM annotations
                     WHERE document_id = $1 AND annotation_type = $2 AND page = $3
                     ORDER BY created_at ASC, id ASC"
                );
                sqlx::query_as::<_, Annotation>(&query)
                    .bind(document_id)
                    .bind(kind.as_str())
                    .bind(page)
                    .fetch_all(pool)
                    .await
            }
            (Some(kind), None) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM annotations
                     WHERE document_id = $1 AND annotation_type = $2
                     ORDER BY created_at ASC, id ASC"
                );
                sqlx::query_as::<_, Annotation>(&query)
                    .bind(document_id)
                    .bind(kind.as_str())
                    .fetch_all(pool)
                    .await
            }
            (None, Some(page)) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM annotations
                     WHERE document_id = $1 AND page = $2
                     ORDER BY created_at ASC, id ASC"
                );
                sqlx::query_as::<_, Annotation>(&query)
                    .bind(document_id)
                    .bind(page)
                    .fetch_all(pool)
                    .await
            }
            (None, None) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM annotations
                     WHERE document_id = $1
                     ORDER BY created_at ASC, id ASC"
                );
                sqlx::query_as::<_, Annotation>(&query)
                    .bind(document_id)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Apply a validated patch in a single statement, bumping `updated_at`.
    ///
    /// Each field pairs a presence flag with a value so an absent field keeps
    /// its current value while a present null clears it (COALESCE alone
    /// cannot express the latter). Returns `None` if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &AnnotationPatch,
    ) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!(
            "UPDATE annotations SET
                page       = CASE WHEN $2  THEN $3  ELSE page END,
                x_percent  = CASE WHEN $4  THEN $5  ELSE x_percent END,
                y_percent  = CASE WHEN $6  THEN $7  ELSE y_percent END,
                x_pixel    = CASE WHEN $8  THEN $9  ELSE x_pixel END,
                y_pixel    = CASE WHEN $10 THEN $11 ELSE y_pixel END,
                color      = CASE WHEN $12 THEN $13 ELSE color END,
                content    = CASE WHEN $14 THEN $15 ELSE content END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .bind(patch.page.is_some())
            .bind(patch.page.flatten())
            .bind(patch.x_percent.is_some())
            .bind(patch.x_percent.flatten())
            .bind(patch.y_percent.is_some())
            .bind(patch.y_percent.flatten())
            .bind(patch.x_pixel.is_some())
            .bind(patch.x_pixel.flatten())
            .bind(patch.y_pixel.is_some())
            .bind(patch.y_pixel.flatten())
            .bind(patch.color.is_some())
            .bind(patch.color.clone().flatten())
            .bind(patch.content.is_some())
            .bind(patch.content.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Delete an annotation by its ID. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
