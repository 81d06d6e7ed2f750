//! Session client
//!
//! Ties the layout selection, upload session, latest analysis result and
//! export gating together behind one handle. At most one network operation
//! runs at a time; asking for another while one is in flight fails with
//! `OperationInFlight` instead of queueing.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use cta_common::config::ClientConfig;
use cta_common::events::{EventBus, SessionEvent};
use cta_common::{AnalysisKind, ExportFormat, LayoutChoice};
use tokio::sync::{broadcast, Mutex, MutexGuard, RwLock};

use crate::error::{ClientError, ClientResult};
use crate::models::{
    enabled_actions, ActionSet, AnalysisResult, LayoutSelector, OraccOptions, UploadFile,
    UploadSession,
};
use crate::services::{
    build_export_reference, render, AnalysisDispatcher, ExportReference, HttpTransport,
    RenderedResult, RetryPolicy, Transport, UploadManager,
};

/// Mutable session state
#[derive(Debug, Default)]
struct SessionState {
    layout: LayoutSelector,
    oracc_options: OraccOptions,
    session: Option<UploadSession>,
    /// Latest successful analysis; cleared by a new upload
    result: Option<AnalysisResult>,
}

/// Held for the duration of one network operation
struct OperationGuard<'a> {
    _lock: MutexGuard<'a, ()>,
    in_flight: &'a AtomicBool,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Upload/analyze/export session against one analysis server
pub struct SessionClient<T: Transport> {
    transport: T,
    uploads: UploadManager,
    dispatcher: AnalysisDispatcher,
    events: EventBus,
    state: RwLock<SessionState>,
    op_lock: Mutex<()>,
    in_flight: AtomicBool,
}

impl SessionClient<HttpTransport> {
    /// Build an HTTP-backed client from resolved configuration
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let transport = HttpTransport::new(config.server_origin())?
            .with_request_timeout(config.retry.attempt_timeout());

        Ok(Self::new(
            transport,
            RetryPolicy::from_config(&config.retry),
            config.default_layout,
            EventBus::new(config.event_capacity),
        ))
    }
}

impl<T: Transport> SessionClient<T> {
    pub fn new(
        transport: T,
        policy: RetryPolicy,
        default_layout: LayoutChoice,
        events: EventBus,
    ) -> Self {
        Self {
            transport,
            uploads: UploadManager::new(policy, events.clone()),
            dispatcher: AnalysisDispatcher::new(events.clone()),
            events,
            state: RwLock::new(SessionState {
                layout: LayoutSelector::new(default_layout),
                ..SessionState::default()
            }),
            op_lock: Mutex::new(()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscribe to status events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn begin_operation(&self) -> ClientResult<OperationGuard<'_>> {
        let lock = self
            .op_lock
            .try_lock()
            .map_err(|_| ClientError::OperationInFlight)?;
        self.in_flight.store(true, Ordering::SeqCst);
        Ok(OperationGuard {
            _lock: lock,
            in_flight: &self.in_flight,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    // ========================================
    // Selection
    // ========================================

    /// Choose the layout for the next upload; the last choice wins
    pub async fn select_layout(&self, layout: LayoutChoice) {
        self.state.write().await.layout.select(layout);
        tracing::debug!(%layout, "Layout selected");
    }

    pub async fn selected_layout(&self) -> LayoutChoice {
        self.state.read().await.layout.selected()
    }

    /// Options sent with the next Oracc analysis
    pub async fn set_oracc_options(&self, options: OraccOptions) {
        self.state.write().await.oracc_options = options;
    }

    pub async fn oracc_options(&self) -> OraccOptions {
        self.state.read().await.oracc_options
    }

    // ========================================
    // Operations
    // ========================================

    /// Upload `file` under the selected layout
    ///
    /// On success the new session replaces the old one and any previous
    /// result is discarded. On failure the previous session stays.
    pub async fn upload(&self, file: Option<UploadFile>) -> ClientResult<UploadSession> {
        let _guard = self.begin_operation()?;
        let layout = self.selected_layout().await;

        let response = self
            .uploads
            .upload(&self.transport, file.as_ref(), layout)
            .await?;

        let session = UploadSession::from_response(response, layout);
        let mut state = self.state.write().await;
        state.session = Some(session.clone());
        state.result = None;
        Ok(session)
    }

    /// Run one analysis against the active session
    ///
    /// On success the result replaces the previous one. On failure the
    /// previous result stays displayed.
    pub async fn analyze(&self, kind: AnalysisKind) -> ClientResult<RenderedResult> {
        let _guard = self.begin_operation()?;

        let (upload_id, options) = {
            let state = self.state.read().await;
            (
                state.session.as_ref().map(|s| s.upload_id.clone()),
                state.oracc_options,
            )
        };

        let result = self
            .dispatcher
            .analyze(&self.transport, kind, upload_id.as_deref(), options)
            .await?;

        let rendered = render(&result);
        self.state.write().await.result = Some(result);
        Ok(rendered)
    }

    /// Export reference for the current result in `format`
    pub async fn export_reference(&self, format: ExportFormat) -> ClientResult<ExportReference> {
        let reference = {
            let state = self.state.read().await;
            build_export_reference(
                format,
                state.result.as_ref().map(AnalysisResult::kind),
                state.session.as_ref().map(|s| s.upload_id.as_str()),
            )?
        };

        tracing::info!(%format, reference = %reference, "Export ready");
        self.events.emit_lossy(SessionEvent::ExportReady {
            format,
            reference: reference.path(),
            timestamp: Utc::now(),
        });
        Ok(reference)
    }

    /// Fetch the export for `format` and write it to `path`
    pub async fn save_export(
        &self,
        format: ExportFormat,
        path: &Path,
    ) -> ClientResult<ExportReference> {
        let _guard = self.begin_operation()?;
        let reference = self.export_reference(format).await?;

        let bytes = self
            .transport
            .fetch_export(&reference)
            .await
            .map_err(ClientError::ExportFailed)?;
        tokio::fs::write(path, &bytes).await?;

        tracing::info!(
            reference = %reference,
            path = %path.display(),
            size_bytes = bytes.len(),
            "Export saved"
        );
        Ok(reference)
    }

    // ========================================
    // Queries
    // ========================================

    pub async fn session(&self) -> Option<UploadSession> {
        self.state.read().await.session.clone()
    }

    /// Latest successful result, rendered
    pub async fn result(&self) -> Option<RenderedResult> {
        self.state.read().await.result.as_ref().map(render)
    }

    /// Kind of the latest successful result
    pub async fn active_kind(&self) -> Option<AnalysisKind> {
        self.state
            .read()
            .await
            .result
            .as_ref()
            .map(AnalysisResult::kind)
    }

    /// Actions a front end may offer right now
    pub async fn enabled_actions(&self) -> ActionSet {
        let state = self.state.read().await;
        enabled_actions(
            state.session.as_ref(),
            state.result.as_ref().map(AnalysisResult::kind),
            self.is_busy(),
        )
    }
}
