//! Repository for the `documents` table.

use pagemark_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, Document};

/// Column list for documents queries.
const COLUMNS: &str = "id, filename, original_filename, mime_type, file_size, \
    file_path, converted_path, created_at, updated_at";

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDocument,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (filename, original_filename, mime_type, file_size, file_path)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&input.filename)
            .bind(&input.original_filename)
            .bind(&input.mime_type)
            .bind(input.file_size)
            .bind(&input.file_path)
            .fetch_one(pool)
            .await
    }

    /// Find a document by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List documents, newest first, with offset/limit paging.
    pub async fn list(
        pool: &PgPool,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             ORDER BY created_at DESC, id DESC
             OFFSET $1 LIMIT $2"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Record the path of a successfully converted PDF.
    pub async fn set_converted_path(
        pool: &PgPool,
        id: DbId,
        converted_path: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET converted_path = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(converted_path)
            .fetch_optional(pool)
            .await
    }

    /// Delete a document by its ID. Annotations cascade at the storage level.
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
