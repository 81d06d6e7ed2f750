//! HTTP transport to the analysis server
//!
//! [`Transport`] is the seam between session logic and the network: the
//! upload manager and analysis dispatcher only see [`AttemptFailure`]s, so
//! tests can script outcomes without a server.

use std::time::Duration;

use async_trait::async_trait;
use cta_common::api::{
    ErrorBody, GlossaryCounts, OraccRequest, OraccResponse, SignCounts, TableResponse,
    UploadResponse, WordCounts,
};
use cta_common::{AnalysisKind, LayoutChoice};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{AttemptFailure, ClientError};
use crate::models::{AnalysisResult, OraccOptions, UploadFile};
use crate::services::download_trigger::ExportReference;

const USER_AGENT: &str = concat!("cta-client/", env!("CARGO_PKG_VERSION"));
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Requests the session client needs from the server
#[async_trait]
pub trait Transport: Send + Sync {
    /// One upload attempt: `POST /upload/{layout}` with the file as multipart
    async fn upload_attempt(
        &self,
        file: &UploadFile,
        layout: LayoutChoice,
    ) -> Result<UploadResponse, AttemptFailure>;

    /// One analysis request: `POST /{action}/{upload_id}`
    async fn analyze(
        &self,
        kind: AnalysisKind,
        upload_id: &str,
        options: OraccOptions,
    ) -> Result<AnalysisResult, AttemptFailure>;

    /// Fetch export bytes: `GET /download_{format}/{kind}_{upload_id}`
    async fn fetch_export(&self, reference: &ExportReference) -> Result<Vec<u8>, AttemptFailure>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http_client: reqwest::Client,
    origin: String,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(origin: &str) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            origin: origin.trim().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Deadline for analysis and export requests
    ///
    /// Upload attempts are bounded by the upload manager instead.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    async fn post_analysis<D>(
        &self,
        kind: AnalysisKind,
        upload_id: &str,
        options: OraccOptions,
    ) -> Result<D, AttemptFailure>
    where
        D: DeserializeOwned,
    {
        let url = format!(
            "{}/{}/{}",
            self.origin,
            kind.action_path(),
            urlencoding::encode(upload_id)
        );
        let mut request = self.http_client.post(&url).timeout(self.request_timeout);
        if kind == AnalysisKind::Oracc {
            request = request.json(&OraccRequest::from(options));
        }

        tracing::debug!(%kind, upload_id, "Sending analysis request");

        let response = request
            .send()
            .await
            .map_err(|e| network_failure(e, self.request_timeout))?;
        read_json(response).await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn upload_attempt(
        &self,
        file: &UploadFile,
        layout: LayoutChoice,
    ) -> Result<UploadResponse, AttemptFailure> {
        let url = format!("{}/upload/{}", self.origin, layout);
        let part = Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string());
        let form = Form::new()
            .part("file", part)
            .text("layout", layout.as_str());

        tracing::debug!(
            %layout,
            filename = file.name(),
            size_bytes = file.bytes().len(),
            "Sending upload"
        );

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AttemptFailure::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn analyze(
        &self,
        kind: AnalysisKind,
        upload_id: &str,
        options: OraccOptions,
    ) -> Result<AnalysisResult, AttemptFailure> {
        let result: AnalysisResult = match kind {
            AnalysisKind::Signs => self
                .post_analysis::<TableResponse<SignCounts>>(kind, upload_id, options)
                .await?
                .into(),
            AnalysisKind::Words => self
                .post_analysis::<TableResponse<WordCounts>>(kind, upload_id, options)
                .await?
                .into(),
            AnalysisKind::Glossary => self
                .post_analysis::<TableResponse<GlossaryCounts>>(kind, upload_id, options)
                .await?
                .into(),
            AnalysisKind::Oracc => self
                .post_analysis::<OraccResponse>(kind, upload_id, options)
                .await?
                .into(),
        };
        Ok(result)
    }

    async fn fetch_export(&self, reference: &ExportReference) -> Result<Vec<u8>, AttemptFailure> {
        let url = reference.url(&self.origin);
        let response = self
            .http_client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| network_failure(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_failure(status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| network_failure(e, self.request_timeout))?;
        Ok(bytes.to_vec())
    }
}

/// Decode a 2xx JSON body; anything else is a failure
async fn read_json<D>(response: reqwest::Response) -> Result<D, AttemptFailure>
where
    D: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_failure(status, &body));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AttemptFailure::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AttemptFailure::Malformed(e.to_string()))
}

fn network_failure(err: reqwest::Error, timeout: Duration) -> AttemptFailure {
    if err.is_timeout() {
        AttemptFailure::Timeout(timeout)
    } else {
        AttemptFailure::Network(err.to_string())
    }
}

fn status_failure(status: StatusCode, body: &str) -> AttemptFailure {
    tracing::debug!(status = status.as_u16(), "Non-success response");
    AttemptFailure::Status {
        code: status.as_u16(),
        message: error_message(status, body),
    }
}

/// Best human-readable message for a failed response
///
/// Prefers the server's `{"error": "..."}` body, then the raw body text
/// (truncated), then the status reason phrase.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_str::<ErrorBody>(body) {
        if !error.trim().is_empty() {
            return error;
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
