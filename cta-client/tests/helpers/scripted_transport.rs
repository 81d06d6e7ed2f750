//! Scripted transport
//!
//! Plays back queued outcomes in order and records every call, so session
//! tests can count network activity without a server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cta_client::error::AttemptFailure;
use cta_client::models::{AnalysisResult, OraccOptions, UploadFile};
use cta_client::services::{ExportReference, Transport};
use cta_common::api::UploadResponse;
use cta_common::{AnalysisKind, LayoutChoice};
use tokio::sync::Notify;

/// One scripted upload attempt
pub enum UploadStep {
    Respond(Result<UploadResponse, AttemptFailure>),
    /// Respond only after `delay`; with a paused clock this outlives any timeout
    Delayed(Duration, Result<UploadResponse, AttemptFailure>),
    /// Respond once the test calls `notify_one` on the gate
    Gated(Arc<Notify>, Result<UploadResponse, AttemptFailure>),
}

/// Recorded transport call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload {
        filename: String,
        layout: LayoutChoice,
    },
    Analyze {
        kind: AnalysisKind,
        upload_id: String,
        options: OraccOptions,
    },
    Export(String),
}

#[derive(Default)]
pub struct ScriptedTransport {
    uploads: Mutex<VecDeque<UploadStep>>,
    analyses: Mutex<VecDeque<Result<AnalysisResult, AttemptFailure>>>,
    exports: Mutex<VecDeque<Result<Vec<u8>, AttemptFailure>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, step: UploadStep) -> &Self {
        self.uploads.lock().unwrap().push_back(step);
        self
    }

    pub fn push_upload_ok(&self, response: UploadResponse) -> &Self {
        self.push_upload(UploadStep::Respond(Ok(response)))
    }

    pub fn push_upload_err(&self, failure: AttemptFailure) -> &Self {
        self.push_upload(UploadStep::Respond(Err(failure)))
    }

    pub fn push_analysis(&self, outcome: Result<AnalysisResult, AttemptFailure>) -> &Self {
        self.analyses.lock().unwrap().push_back(outcome);
        self
    }

    pub fn push_export(&self, outcome: Result<Vec<u8>, AttemptFailure>) -> &Self {
        self.exports.lock().unwrap().push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn upload_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Upload { .. }))
            .count()
    }

    pub fn analyze_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Analyze { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn upload_attempt(
        &self,
        file: &UploadFile,
        layout: LayoutChoice,
    ) -> Result<UploadResponse, AttemptFailure> {
        self.record(Call::Upload {
            filename: file.name().to_string(),
            layout,
        });

        let step = self.uploads.lock().unwrap().pop_front();
        match step {
            Some(UploadStep::Respond(outcome)) => outcome,
            Some(UploadStep::Delayed(delay, outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            Some(UploadStep::Gated(gate, outcome)) => {
                gate.notified().await;
                outcome
            }
            None => Err(AttemptFailure::Network("no scripted upload".to_string())),
        }
    }

    async fn analyze(
        &self,
        kind: AnalysisKind,
        upload_id: &str,
        options: OraccOptions,
    ) -> Result<AnalysisResult, AttemptFailure> {
        self.record(Call::Analyze {
            kind,
            upload_id: upload_id.to_string(),
            options,
        });

        let outcome = self.analyses.lock().unwrap().pop_front();
        outcome.unwrap_or_else(|| Err(AttemptFailure::Network("no scripted analysis".to_string())))
    }

    async fn fetch_export(&self, reference: &ExportReference) -> Result<Vec<u8>, AttemptFailure> {
        self.record(Call::Export(reference.path()));

        let outcome = self.exports.lock().unwrap().pop_front();
        outcome.unwrap_or_else(|| Err(AttemptFailure::Network("no scripted export".to_string())))
    }
}
