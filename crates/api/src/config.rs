use std::path::PathBuf;

use pagemark_core::document::{UploadPolicy, DEFAULT_MAX_FILE_SIZE_BYTES};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upload and conversion settings.
    pub upload: UploadConfig,
}

/// File-upload settings: where files land, how large they may be, and how
/// long a PDF conversion may run.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory where uploaded files are stored (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Timeout for a single LibreOffice conversion (default: `60`).
    pub conversion_timeout_secs: u64,
    /// Accepted MIME types and the size cap.
    pub policy: UploadPolicy,
}

impl UploadConfig {
    /// Directory where converted PDFs are stored.
    pub fn converted_dir(&self) -> PathBuf {
        self.upload_dir.join("converted")
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `3000`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                     |
    /// | `UPLOAD_DIR`              | `uploads`                |
    /// | `MAX_UPLOAD_BYTES`        | `104857600` (100 MiB)    |
    /// | `CONVERSION_TIMEOUT_SECS` | `60`                     |
    /// | `ALLOWED_MIME_TYPES`      | pdf, doc, docx, png, jpeg|
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        let max_file_size_bytes: u64 = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid u64");

        let conversion_timeout_secs: u64 = std::env::var("CONVERSION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("CONVERSION_TIMEOUT_SECS must be a valid u64");

        let mut policy = UploadPolicy {
            max_file_size_bytes,
            ..UploadPolicy::default()
        };
        if let Ok(types) = std::env::var("ALLOWED_MIME_TYPES") {
            let allowed: Vec<String> = types
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !allowed.is_empty() {
                policy.allowed_mime_types = allowed;
            }
        }

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload: UploadConfig {
                upload_dir,
                conversion_timeout_secs,
                policy,
            },
        }
    }
}
