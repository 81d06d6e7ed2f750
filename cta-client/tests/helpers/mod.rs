//! Test Helper Utilities
//!
//! Shared utilities for testing cta-client

#![allow(dead_code, unused_imports)]

pub mod log_capture;
pub mod mock_server;
pub mod scripted_transport;

pub use log_capture::{LogCapture, LogRecord};
pub use mock_server::{MockServer, SIGNS_FIXTURE};
pub use scripted_transport::{Call, ScriptedTransport, UploadStep};

use cta_client::models::UploadFile;
use cta_common::api::UploadResponse;

/// Non-empty document standing in for a .docx upload
pub fn tablet_file() -> UploadFile {
    UploadFile::new("tablet.docx", b"PK\x03\x04 tablet".to_vec())
}

pub fn upload_response(upload_id: &str) -> UploadResponse {
    UploadResponse {
        upload_id: upload_id.to_string(),
        filename: "tablet.docx".to_string(),
        message: Some("File uploaded successfully".to_string()),
    }
}
