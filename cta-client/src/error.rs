//! Error types for cta-client
//!
//! Session operations fail with [`ClientError`]. Individual HTTP attempts
//! fail with [`AttemptFailure`], which the upload retry loop consumes and
//! the analysis dispatcher folds into `AnalysisRequestFailed`.

use std::time::Duration;

use cta_common::{AnalysisKind, ExportFormat};
use thiserror::Error;

/// Why a single request did not produce a usable response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    /// Deadline elapsed before a response arrived
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection or transfer error
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status, whatever the body said
    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },

    /// Body did not decode into the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Session client error
#[derive(Debug, Error)]
pub enum ClientError {
    /// Upload requested without a (non-empty) file
    #[error("No file selected")]
    NoFileSelected,

    /// Analysis or export requested before a successful upload
    #[error("No active upload session")]
    NoActiveSession,

    /// One upload attempt failed; retried by the upload manager
    #[error("Upload attempt {attempt} failed: {cause}")]
    TransientUploadFailure { attempt: u32, cause: AttemptFailure },

    /// All upload attempts failed
    #[error("Upload failed after {attempts} attempt(s): {message}")]
    UploadFailed { attempts: u32, message: String },

    /// Single analysis request failed (not retried)
    #[error("{kind} analysis failed: {message}")]
    AnalysisRequestFailed { kind: AnalysisKind, message: String },

    /// Export format not available for the current result
    #[error("{format} export is not available{}", export_context(.kind))]
    ExportNotEnabled {
        format: ExportFormat,
        kind: Option<AnalysisKind>,
    },

    /// Another session operation has not finished yet
    #[error("Another operation is still in progress")]
    OperationInFlight,

    /// Export download failed
    #[error("Export download failed: {0}")]
    ExportFailed(AttemptFailure),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// cta-common error
    #[error("Common error: {0}")]
    Common(#[from] cta_common::Error),
}

fn export_context(kind: &Option<AnalysisKind>) -> String {
    match kind {
        Some(kind) => format!(" after a {} analysis", kind),
        None => " before an analysis".to_string(),
    }
}

/// Result type for session operations
pub type ClientResult<T> = Result<T, ClientError>;
