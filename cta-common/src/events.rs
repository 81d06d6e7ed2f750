//! Session status events
//!
//! Upload progress, analysis completion and failures are published on an
//! [`EventBus`] so any front end (terminal, web page, test harness) can show
//! them in its status area without the session logic knowing about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::api::types::{AnalysisKind, ExportFormat};

/// Session status event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// An upload attempt is about to be sent
    UploadAttemptStarted {
        /// 1-based attempt number
        attempt: u32,
        max_attempts: u32,
        timestamp: DateTime<Utc>,
    },

    /// An upload attempt failed and may be retried
    UploadAttemptFailed {
        attempt: u32,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Upload accepted; analysis actions are now available
    UploadSucceeded {
        upload_id: String,
        filename: String,
        timestamp: DateTime<Utc>,
    },

    /// Every attempt failed; the previous session is untouched
    UploadFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },

    AnalysisStarted {
        kind: AnalysisKind,
        timestamp: DateTime<Utc>,
    },

    AnalysisCompleted {
        kind: AnalysisKind,
        timestamp: DateTime<Utc>,
    },

    AnalysisFailed {
        kind: AnalysisKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// An export reference was built and handed to the caller
    ExportReady {
        format: ExportFormat,
        reference: String,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// One-line status text for display
    pub fn status_line(&self) -> String {
        match self {
            SessionEvent::UploadAttemptStarted {
                attempt,
                max_attempts,
                ..
            } => format!("Uploading (attempt {}/{})...", attempt, max_attempts),
            SessionEvent::UploadAttemptFailed { attempt, reason, .. } => {
                format!("Attempt {} failed: {}", attempt, reason)
            }
            SessionEvent::UploadSucceeded { filename, .. } => {
                format!("Uploaded {}", filename)
            }
            SessionEvent::UploadFailed { message, .. } => format!("Upload failed: {}", message),
            SessionEvent::AnalysisStarted { kind, .. } => format!("Running {} analysis...", kind),
            SessionEvent::AnalysisCompleted { kind, .. } => format!("{} analysis complete", kind),
            SessionEvent::AnalysisFailed { kind, message, .. } => {
                format!("{} analysis failed: {}", kind, message)
            }
            SessionEvent::ExportReady {
                format, reference, ..
            } => format!("{} export ready: {}", format, reference),
        }
    }
}

/// Event distribution bus backed by `tokio::sync::broadcast`
///
/// Publishing never blocks; slow subscribers see `Lagged` instead of
/// holding up the session.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
