//! Upload session state
//!
//! A session exists only after the server accepted an upload. It is
//! replaced by the next successful upload and never touched by a failed one.

use std::path::Path;

use chrono::{DateTime, Utc};
use cta_common::api::UploadResponse;
use cta_common::LayoutChoice;
use serde::Serialize;

/// File chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its final path component as name
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Server-acknowledged upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSession {
    /// Opaque server token, kept byte-for-byte
    pub upload_id: String,
    /// File name as reported by the server
    pub display_name: String,
    /// Layout the file was uploaded under
    pub layout: LayoutChoice,
    pub message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadSession {
    pub fn from_response(response: UploadResponse, layout: LayoutChoice) -> Self {
        Self {
            upload_id: response.upload_id,
            display_name: response.filename,
            layout,
            message: response.message,
            uploaded_at: Utc::now(),
        }
    }
}

/// Exclusive layout selection
///
/// Holds exactly one layout. Selecting one replaces the previous choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSelector {
    selected: LayoutChoice,
}

impl LayoutSelector {
    pub fn new(fallback: LayoutChoice) -> Self {
        Self { selected: fallback }
    }

    pub fn select(&mut self, layout: LayoutChoice) {
        self.selected = layout;
    }

    pub fn selected(&self) -> LayoutChoice {
        self.selected
    }

    pub fn is_selected(&self, layout: LayoutChoice) -> bool {
        self.selected == layout
    }
}
