//! Upload with bounded retry
//!
//! **Algorithm:**
//! 1. Reject a missing or empty file before any network activity
//! 2. Send one attempt, bounded by the per-attempt timeout
//! 3. A well-formed 2xx response ends the loop with that result
//! 4. Timeout, non-2xx status, network error or unparsable body counts as
//!    a transient failure: log WARN, emit a status event, retry
//! 5. After `max_attempts` failures: log ERROR, return `UploadFailed`
//!
//! Attempts run strictly one after another. A timed-out attempt's future is
//! dropped, so a late response from it can never reach the caller.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use cta_common::api::UploadResponse;
use cta_common::config::RetryConfig;
use cta_common::events::{EventBus, SessionEvent};
use cta_common::LayoutChoice;

use crate::error::{AttemptFailure, ClientError};
use crate::models::UploadFile;
use crate::services::transport::Transport;

/// Bounded retry policy for uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    attempt_timeout: Duration,
    retry_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_timeout,
            retry_delay: Duration::ZERO,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.attempt_timeout())
            .with_retry_delay(config.retry_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

impl Default for RetryPolicy {
    /// Three attempts of 30 seconds each
    fn default() -> Self {
        Self::new(3, Duration::from_secs(30))
    }
}

/// Progress notification from [`retry_with_timeout`]
#[derive(Debug)]
pub enum AttemptEvent<'a> {
    Started { attempt: u32, max_attempts: u32 },
    Failed { attempt: u32, failure: &'a AttemptFailure },
}

/// Every attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_failure: AttemptFailure,
}

/// Run `operation` until it succeeds or the policy's attempts run out
///
/// `operation` receives the 1-based attempt number. Each call is wrapped in
/// its own timeout; elapsing it cancels only that attempt.
pub async fn retry_with_timeout<F, Fut, T, O>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut observer: O,
    mut operation: F,
) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptFailure>>,
    O: FnMut(AttemptEvent<'_>),
{
    let start_time = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        observer(AttemptEvent::Started {
            attempt,
            max_attempts: policy.max_attempts,
        });
        tracing::debug!(
            operation = operation_name,
            attempt,
            max_attempts = policy.max_attempts,
            "Starting attempt"
        );

        let outcome = match tokio::time::timeout(policy.attempt_timeout, operation(attempt)).await
        {
            Ok(result) => result,
            Err(_) => Err(AttemptFailure::Timeout(policy.attempt_timeout)),
        };

        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(failure) => {
                observer(AttemptEvent::Failed {
                    attempt,
                    failure: &failure,
                });

                if attempt >= policy.max_attempts {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        error = %failure,
                        "Operation failed: attempts exhausted"
                    );
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_failure: failure,
                    });
                }

                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    remaining = policy.max_attempts - attempt,
                    error = %failure,
                    "Attempt failed, will retry"
                );

                if !policy.retry_delay.is_zero() {
                    tokio::time::sleep(policy.retry_delay).await;
                }
            }
        }
    }
}

/// Uploads a file under a layout, retrying transient failures
pub struct UploadManager {
    policy: RetryPolicy,
    events: EventBus,
}

impl UploadManager {
    pub fn new(policy: RetryPolicy, events: EventBus) -> Self {
        Self { policy, events }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Upload `file` under `layout`
    ///
    /// Returns the server's acknowledgement; the caller records the session.
    pub async fn upload<T>(
        &self,
        transport: &T,
        file: Option<&UploadFile>,
        layout: LayoutChoice,
    ) -> Result<UploadResponse, ClientError>
    where
        T: Transport + ?Sized,
    {
        let file = match file {
            Some(file) if !file.is_empty() => file,
            _ => return Err(ClientError::NoFileSelected),
        };

        tracing::info!(
            filename = file.name(),
            %layout,
            max_attempts = self.policy.max_attempts,
            "Uploading file"
        );

        let events = &self.events;
        let observer = |event: AttemptEvent<'_>| match event {
            AttemptEvent::Started {
                attempt,
                max_attempts,
            } => events.emit_lossy(SessionEvent::UploadAttemptStarted {
                attempt,
                max_attempts,
                timestamp: Utc::now(),
            }),
            AttemptEvent::Failed { attempt, failure } => {
                let transient = ClientError::TransientUploadFailure {
                    attempt,
                    cause: failure.clone(),
                };
                events.emit_lossy(SessionEvent::UploadAttemptFailed {
                    attempt,
                    reason: transient.to_string(),
                    timestamp: Utc::now(),
                });
            }
        };

        let outcome = retry_with_timeout("upload", &self.policy, observer, |_attempt| {
            transport.upload_attempt(file, layout)
        })
        .await;

        match outcome {
            Ok(response) => {
                tracing::info!(
                    upload_id = %response.upload_id,
                    filename = %response.filename,
                    "Upload accepted"
                );
                self.events.emit_lossy(SessionEvent::UploadSucceeded {
                    upload_id: response.upload_id.clone(),
                    filename: response.filename.clone(),
                    timestamp: Utc::now(),
                });
                Ok(response)
            }
            Err(exhausted) => {
                let message = exhausted.last_failure.to_string();
                self.events.emit_lossy(SessionEvent::UploadFailed {
                    message: message.clone(),
                    timestamp: Utc::now(),
                });
                Err(ClientError::UploadFailed {
                    attempts: exhausted.attempts,
                    message,
                })
            }
        }
    }
}
