//! Upload policy and stored-file naming for uploaded documents.
//!
//! The policy is an explicit value constructed from configuration and passed
//! into the upload path, never process-wide state.

use std::path::Path;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default upload size cap: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// MIME types accepted for upload by default.
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/png",
    "image/jpeg",
    "image/jpg",
];

/// MIME types that get converted to PDF after upload (DOC and DOCX).
pub const CONVERTIBLE_MIME_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

// ---------------------------------------------------------------------------
// Upload policy
// ---------------------------------------------------------------------------

/// What the service accepts as a document upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_mime_types: Vec<String>,
    pub max_file_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Check that a MIME type is in the allowed set.
    pub fn check_mime(&self, mime: &str) -> Result<(), CoreError> {
        if !self.allowed_mime_types.iter().any(|m| m == mime) {
            return Err(CoreError::Validation(format!(
                "Unsupported file format '{mime}'. Supported types: {}",
                self.allowed_mime_types.join(", ")
            )));
        }
        Ok(())
    }

    /// Whether a payload of `size` bytes exceeds the configured cap.
    pub fn exceeds_size(&self, size: u64) -> bool {
        size > self.max_file_size_bytes
    }
}

/// Whether uploads of this MIME type are converted to PDF.
pub fn is_convertible_mime(mime: &str) -> bool {
    CONVERTIBLE_MIME_TYPES.contains(&mime)
}

/// Validate the client-supplied filename (non-empty after trimming).
pub fn validate_original_filename(filename: &str) -> Result<(), CoreError> {
    if filename.trim().is_empty() {
        return Err(CoreError::Validation(
            "Filename cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Generate a unique stored filename, keeping the original extension.
pub fn stored_filename(original_filename: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) if !ext.is_empty() => format!("{id}.{ext}"),
        _ => id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
