//! Data models for cta-client
//!
//! - Upload session and layout selection
//! - Kind-tagged analysis results
//! - Enabled-action derivation

pub mod actions;
pub mod analysis;
pub mod session;

pub use actions::{enabled_actions, Action, ActionSet};
pub use analysis::{AnalysisResult, OraccOptions};
pub use session::{LayoutSelector, UploadFile, UploadSession};
