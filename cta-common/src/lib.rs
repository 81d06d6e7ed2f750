//! # CTA Common Library
//!
//! Shared code for the Cuneiform Text Analysis session client including:
//! - Wire types for the analysis server's HTTP contract
//! - Analysis kinds, layouts and export formats
//! - Configuration loading
//! - Session status events (EventBus)

pub mod api;
pub mod config;
pub mod error;
pub mod events;

pub use api::types::{AnalysisKind, ExportFormat, LayoutChoice};
pub use error::{Error, Result};
