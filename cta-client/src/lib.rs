//! cta-client library interface
//!
//! Session client for the cuneiform text analysis server: upload a
//! transliteration document under a layout, run sign/word/glossary/Oracc
//! analyses on it, render the results and build export references.

pub mod client;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use crate::client::SessionClient;
pub use crate::error::{AttemptFailure, ClientError, ClientResult};
