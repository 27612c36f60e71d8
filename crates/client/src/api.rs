//! REST API client for the remote generation service.
//!
//! Wraps the imagine (submit), fetch (status), button (upscale /
//! variation) and account-info endpoints using [`reqwest`]. Every call is
//! a single attempt bounded by the configured timeout; retries are the
//! caller's business.

use serde::Serialize;
use serde_json::{json, Value};

use novagen_core::button::ButtonCode;
use novagen_core::config::GenerationConfig;
use novagen_core::normalize::extract_job_id;

/// Submit endpoint.
const IMAGINE_PATH: &str = "nova/imagine";
/// Status endpoint prefix; the job id is appended.
const FETCH_PATH: &str = "message/fetch";
/// Derivative action endpoint.
const BUTTON_PATH: &str = "nova/button";
/// Account / credits endpoint.
const ACCOUNT_INFO_PATH: &str = "subscription/account-info";

/// HTTP client for the remote generation API.
pub struct ImagineApi {
    client: reqwest::Client,
    config: GenerationConfig,
}

/// Errors from the remote API layer.
#[derive(Debug, thiserror::Error)]
pub enum ImagineApiError {
    /// No credential is configured; the call was not attempted.
    #[error("API key not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote returned a non-2xx status code.
    #[error("Remote API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured base URL cannot carry a job id path segment.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The remote accepted the call but its response carried no job id.
    #[error("Failed to get new message ID from {operation} response")]
    MissingJobId {
        /// Which remote operation misbehaved (`imagine`, `button`).
        operation: &'static str,
    },
}

impl ImagineApiError {
    /// `true` for failures of the network call itself, as opposed to
    /// configuration or contract problems.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::ApiError { .. })
    }
}

/// Result of a successful button action.
#[derive(Debug, Clone, Serialize)]
pub struct ButtonOutcome {
    /// Id of the newly derived job.
    pub message_id: String,
    pub button: ButtonCode,
    pub raw_response: Value,
}

/// Account credit summary, with the remote's missing fields defaulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub credits_extra: Value,
    pub credits: Value,
    pub credits_quota: Value,
    #[serde(rename = "type")]
    pub account_type: String,
    pub email: String,
    pub expired_at: String,
}

impl AccountInfo {
    /// Pick the known fields out of an account-info response body.
    pub fn from_response(body: &Value) -> Self {
        Self {
            credits_extra: number_or_zero(body, "creditsExtra"),
            credits: number_or_zero(body, "credits"),
            credits_quota: number_or_zero(body, "creditsQuota"),
            account_type: string_or(body, "type", "UNKNOWN"),
            email: string_or(body, "email", ""),
            expired_at: string_or(body, "expiredAt", ""),
        }
    }
}

fn number_or_zero(body: &Value, key: &str) -> Value {
    body.get(key)
        .filter(|v| v.is_number())
        .cloned()
        .unwrap_or_else(|| json!(0))
}

fn string_or(body: &Value, key: &str, default: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl ImagineApi {
    /// Create a new API client from the shared generation settings.
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for sharing a connection pool with the image downloader).
    pub fn with_client(client: reqwest::Client, config: GenerationConfig) -> Self {
        Self { client, config }
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Submit a prompt for generation.
    ///
    /// Sends `POST /nova/imagine` with the prompt and the server-side
    /// timeout hint. Returns `Ok(None)` when the remote answered
    /// successfully but no job id could be found in the body; callers must
    /// treat that as a failed submission.
    pub async fn submit(&self, prompt: &str) -> Result<Option<String>, ImagineApiError> {
        let api_key = self.api_key()?;
        let body = json!({
            "prompt": prompt,
            "timeout": self.config.remote_timeout_hint_secs,
        });

        let response = self
            .client
            .post(self.config.endpoint(IMAGINE_PATH))
            .bearer_auth(api_key)
            .timeout(self.config.request_timeout)
            .json(&body)
            .send()
            .await?;

        let data: Value = Self::parse_response(response).await?;
        let message_id = extract_job_id(&data);

        match &message_id {
            Some(id) => tracing::info!(message_id = %id, "Prompt submitted"),
            None => tracing::warn!(response = %data, "Imagine response carried no message id"),
        }

        Ok(message_id)
    }

    /// Fetch the raw status body for a job.
    ///
    /// Sends `GET /message/fetch/{job_id}` and returns the decoded JSON
    /// untouched; see [`novagen_core::normalize`] for interpretation.
    pub async fn fetch_status(&self, job_id: &str) -> Result<Value, ImagineApiError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.fetch_url(job_id)?)
            .bearer_auth(api_key)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Derive a new job from an existing one via an upscale / variation
    /// button.
    ///
    /// Sends `POST /nova/button` with `{messageId, button}`. Unlike
    /// [`submit`](Self::submit), a response without a new job id is an
    /// error ([`ImagineApiError::MissingJobId`]).
    pub async fn apply_button(
        &self,
        job_id: &str,
        button: &ButtonCode,
    ) -> Result<ButtonOutcome, ImagineApiError> {
        let api_key = self.api_key()?;
        let body = json!({
            "messageId": job_id,
            "button": button.as_str(),
        });

        let response = self
            .client
            .post(self.config.endpoint(BUTTON_PATH))
            .bearer_auth(api_key)
            .timeout(self.config.request_timeout)
            .json(&body)
            .send()
            .await?;

        let data: Value = Self::parse_response(response).await?;
        let message_id =
            extract_job_id(&data).ok_or(ImagineApiError::MissingJobId { operation: "button" })?;

        tracing::info!(
            original_message_id = %job_id,
            message_id = %message_id,
            button = %button,
            "Button action applied",
        );

        Ok(ButtonOutcome {
            message_id,
            button: button.clone(),
            raw_response: data,
        })
    }

    /// Look up the account's remaining credits.
    pub async fn account_info(&self) -> Result<AccountInfo, ImagineApiError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.config.endpoint(ACCOUNT_INFO_PATH))
            .bearer_auth(api_key)
            .timeout(self.config.credits_timeout)
            .send()
            .await?;

        let data: Value = Self::parse_response(response).await?;
        Ok(AccountInfo::from_response(&data))
    }

    // ---- private helpers ----

    /// `{base}/message/fetch/{job_id}` with the id pushed as a single,
    /// escaped path segment, so `/` or `..` in an id cannot reach another
    /// endpoint.
    fn fetch_url(&self, job_id: &str) -> Result<reqwest::Url, ImagineApiError> {
        let invalid = || ImagineApiError::InvalidBaseUrl(self.config.base_url.clone());
        let mut url =
            reqwest::Url::parse(&self.config.endpoint(FETCH_PATH)).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }

    fn api_key(&self) -> Result<&str, ImagineApiError> {
        self.config
            .require_api_key()
            .map_err(|_| ImagineApiError::NotConfigured)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ImagineApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ImagineApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ImagineApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ImagineApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
