//! Service modules for the upload/analyze/export workflow
//!
//! - `transport`: HTTP seam to the analysis server
//! - `upload_manager`: upload with bounded retry
//! - `analysis_dispatcher`: single-shot analysis requests
//! - `result_renderer`: table/markup display plus diagnostics
//! - `download_trigger`: export references

pub mod analysis_dispatcher;
pub mod download_trigger;
pub mod result_renderer;
pub mod transport;
pub mod upload_manager;

pub use analysis_dispatcher::AnalysisDispatcher;
pub use download_trigger::{build_export_reference, ExportReference};
pub use result_renderer::{escape_html, render, DisplayRepresentation, RenderedResult, TableRow};
pub use transport::{HttpTransport, Transport};
pub use upload_manager::{retry_with_timeout, AttemptEvent, RetryExhausted, RetryPolicy, UploadManager};
