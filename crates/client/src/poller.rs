//! Fixed-interval completion polling.
//!
//! [`poll_until_complete`] repeatedly fetches a job's status until it
//! reaches a terminal state. Unlike a bare sleep loop it can be stopped
//! from the outside through a [`CancellationToken`], and optionally bounded
//! by a deadline. The status source is a trait so tests can script the
//! remote's answers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use novagen_core::normalize::{normalize, NormalizedStatus};

use crate::api::{ImagineApi, ImagineApiError};
use crate::events::PollEvent;

/// Default delay between two status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Anything that can return a raw status body for a job id.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> Result<Value, ImagineApiError>;
}

#[async_trait]
impl StatusSource for ImagineApi {
    async fn fetch_status(&self, job_id: &str) -> Result<Value, ImagineApiError> {
        ImagineApi::fetch_status(self, job_id).await
    }
}

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between the end of one fetch and the start of the next.
    pub interval: Duration,
    /// Give up after this long. `None` polls until a terminal status or
    /// cancellation.
    pub max_wait: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }
}

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// `DONE`. Carries the normalized view and the raw body, which the
    /// archive needs verbatim.
    Completed { status: NormalizedStatus, raw: Value },
    /// `FAILED` or `ERROR`.
    Failed(NormalizedStatus),
    /// The cancellation token fired.
    Cancelled,
    /// `max_wait` elapsed before a terminal status was seen.
    TimedOut,
}

/// Poll `job_id` until it reaches a terminal status.
///
/// The first fetch happens immediately. `on_event` receives a
/// [`PollEvent::Progress`] for every fetch, followed by one
/// [`PollEvent::Completed`] or [`PollEvent::Failed`] at the end. Transport
/// and configuration errors abort polling and are returned as-is.
pub async fn poll_until_complete<S, F>(
    source: &S,
    job_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_event: F,
) -> Result<PollOutcome, ImagineApiError>
where
    S: StatusSource + ?Sized,
    F: FnMut(&PollEvent),
{
    let deadline = config.max_wait.map(|wait| Instant::now() + wait);
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id, attempt, "Polling cancelled");
                return Ok(PollOutcome::Cancelled);
            }
            result = source.fetch_status(job_id) => result?,
        };

        let normalized = normalize(&raw);
        tracing::debug!(
            job_id,
            attempt,
            status = %normalized.status,
            progress = %normalized.progress,
            "Polled job status",
        );

        on_event(&PollEvent::Progress {
            job_id: job_id.to_string(),
            status: normalized.status.clone(),
            progress: normalized.progress.clone(),
        });

        if normalized.status.is_terminal() {
            if normalized.status.is_failure() {
                on_event(&PollEvent::Failed {
                    job_id: job_id.to_string(),
                    status: normalized.status.clone(),
                    progress: normalized.progress.clone(),
                });
                return Ok(PollOutcome::Failed(normalized));
            }

            on_event(&PollEvent::Completed {
                job_id: job_id.to_string(),
                image_urls: normalized.image_urls.clone(),
            });
            return Ok(PollOutcome::Completed {
                status: normalized,
                raw,
            });
        }

        if deadline.is_some_and(|d| Instant::now() + config.interval > d) {
            tracing::warn!(job_id, attempt, "Polling deadline reached");
            return Ok(PollOutcome::TimedOut);
        }

        // Wait before the next fetch, respecting cancellation.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id, attempt, "Polling cancelled");
                return Ok(PollOutcome::Cancelled);
            }
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}
