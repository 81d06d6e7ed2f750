//! Export reference construction
//!
//! Builds `/download_{format}/{kind}_{upload_id}` for the current result.
//! Nothing is fetched here; the reference is handed to whatever performs
//! the navigation (a browser, or [`crate::SessionClient::save_export`]).

use std::fmt;

use cta_common::{AnalysisKind, ExportFormat};
use serde::Serialize;

use crate::error::ClientError;

/// Retrieval reference for one export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReference {
    pub format: ExportFormat,
    pub kind: AnalysisKind,
    pub upload_id: String,
}

impl ExportReference {
    /// Server-relative path with the upload id as given, for display
    pub fn path(&self) -> String {
        format!("/download_{}/{}_{}", self.format, self.kind, self.upload_id)
    }

    /// Server-relative path with the upload id percent-encoded so it stays
    /// inside one path segment
    pub fn request_path(&self) -> String {
        format!(
            "/download_{}/{}_{}",
            self.format,
            self.kind,
            urlencoding::encode(&self.upload_id)
        )
    }

    /// Absolute URL under `origin`
    pub fn url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.request_path())
    }
}

impl fmt::Display for ExportReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Build the export reference for `format`
///
/// Requires an upload session and a completed analysis whose kind enables
/// `format`. Front ends keep the action disabled otherwise; callers that
/// ask anyway get `NoActiveSession` or `ExportNotEnabled`.
pub fn build_export_reference(
    format: ExportFormat,
    analysis_kind: Option<AnalysisKind>,
    upload_id: Option<&str>,
) -> Result<ExportReference, ClientError> {
    let upload_id = upload_id.ok_or(ClientError::NoActiveSession)?;

    match analysis_kind {
        Some(kind) if format.enabled_for(kind) => Ok(ExportReference {
            format,
            kind,
            upload_id: upload_id.to_string(),
        }),
        kind => Err(ClientError::ExportNotEnabled { format, kind }),
    }
}
