//! Office-document to PDF conversion via LibreOffice headless.
//!
//! Conversion runs as a time-bounded subprocess. Callers own the scratch
//! directory and move the produced PDF to its final location; a failed or
//! timed-out conversion never affects the owning upload.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for LibreOffice conversion operations.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("libreoffice binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("conversion failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("conversion timed out after {0} seconds")]
    TimedOut(u64),

    #[error("input file not found: {0}")]
    InputMissing(String),

    #[error("conversion produced no PDF output in {0}")]
    OutputMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert an office document to PDF inside `scratch_dir`.
///
/// Runs `libreoffice --headless --convert-to pdf --outdir <scratch_dir>`
/// with the given timeout (the child is killed if the deadline passes) and
/// returns the path of the PDF produced in the scratch directory. The caller
/// is responsible for moving the file out and removing the directory.
pub async fn convert_to_pdf(
    input_path: &Path,
    scratch_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, ConvertError> {
    if !input_path.exists() {
        return Err(ConvertError::InputMissing(
            input_path.to_string_lossy().to_string(),
        ));
    }

    tokio::fs::create_dir_all(scratch_dir).await?;

    let mut command = tokio::process::Command::new("libreoffice");
    command
        .args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(scratch_dir)
        .arg(input_path)
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result.map_err(ConvertError::NotFound)?,
        // Dropping the in-flight future kills the child (kill_on_drop).
        Err(_) => return Err(ConvertError::TimedOut(timeout.as_secs())),
    };

    if !output.status.success() {
        return Err(ConvertError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    find_pdf_output(scratch_dir, stem).ok_or_else(|| {
        ConvertError::OutputMissing(scratch_dir.to_string_lossy().to_string())
    })
}

/// Locate the PDF LibreOffice produced in `dir`.
///
/// LibreOffice names its output after the input stem; fall back to any PDF
/// in the directory if that expectation does not hold.
pub fn find_pdf_output(dir: &Path, stem: &str) -> Option<PathBuf> {
    let expected = dir.join(format!("{stem}.pdf"));
    if expected.exists() {
        return Some(expected);
    }

    std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|e| e.to_str()) == Some("pdf"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
