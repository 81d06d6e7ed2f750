//! API module for the analysis server's HTTP contract
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP client dependencies)
//! - Shared request/response types
//!
//! The client crate wraps these with the reqwest transport.

pub mod types;

pub use types::{
    AnalysisKind, Diagnostics, ErrorBody, ExportFormat, GlossaryCounts, LabelMap, LayoutChoice,
    OraccRequest, OraccResponse, SignCounts, TableResponse, UploadResponse, WordCounts,
};
