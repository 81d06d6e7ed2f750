//! Analysis dispatch
//!
//! One request per call, never retried: re-running an analysis is a user
//! action. A failure leaves the caller's previous result in place.

use chrono::Utc;
use cta_common::events::{EventBus, SessionEvent};
use cta_common::AnalysisKind;

use crate::error::ClientError;
use crate::models::{AnalysisResult, OraccOptions};
use crate::services::transport::Transport;

/// Issues analysis requests for the active upload
pub struct AnalysisDispatcher {
    events: EventBus,
}

impl AnalysisDispatcher {
    pub fn new(events: EventBus) -> Self {
        Self { events }
    }

    /// Request `kind` for `upload_id`
    ///
    /// `oracc_options` is sent only with Oracc requests. Without an upload id
    /// this fails with `NoActiveSession` and sends nothing.
    pub async fn analyze<T>(
        &self,
        transport: &T,
        kind: AnalysisKind,
        upload_id: Option<&str>,
        oracc_options: OraccOptions,
    ) -> Result<AnalysisResult, ClientError>
    where
        T: Transport + ?Sized,
    {
        let upload_id = upload_id.ok_or(ClientError::NoActiveSession)?;

        self.events.emit_lossy(SessionEvent::AnalysisStarted {
            kind,
            timestamp: Utc::now(),
        });

        let result = match transport.analyze(kind, upload_id, oracc_options).await {
            Ok(result) if result.kind() == kind => result,
            Ok(result) => {
                let message = format!("expected {} result, got {}", kind, result.kind());
                return Err(self.fail(kind, message));
            }
            Err(failure) => return Err(self.fail(kind, failure.to_string())),
        };

        tracing::info!(
            %kind,
            upload_id,
            rows = result.row_count(),
            diagnostics = result.diagnostics().lines().len(),
            "Analysis completed"
        );
        self.events.emit_lossy(SessionEvent::AnalysisCompleted {
            kind,
            timestamp: Utc::now(),
        });

        Ok(result)
    }

    fn fail(&self, kind: AnalysisKind, message: String) -> ClientError {
        tracing::warn!(%kind, error = %message, "Analysis request failed");
        self.events.emit_lossy(SessionEvent::AnalysisFailed {
            kind,
            message: message.clone(),
            timestamp: Utc::now(),
        });
        ClientError::AnalysisRequestFailed { kind, message }
    }
}
