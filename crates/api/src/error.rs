use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use novagen_archive::ArchiveError;
use novagen_client::api::ImagineApiError;
use novagen_core::error::CoreError;
use serde_json::json;

/// Message returned to callers whenever the remote service misbehaves.
/// The upstream details stay in the server log.
const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to reach the image generation service";

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, remote-client and archive errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `novagen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure talking to the remote generation service.
    #[error(transparent)]
    Remote(#[from] ImagineApiError),

    /// A failure reading or modifying the local archive.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Configuration(msg) => {
                    tracing::error!(error = %msg, "Configuration error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CONFIGURATION_ERROR",
                        msg.clone(),
                    )
                }
            },

            // --- Remote service errors ---
            AppError::Remote(err) => classify_remote_error(err),

            // --- Archive errors ---
            AppError::Archive(ArchiveError::InvalidKey(key)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid message ID: '{key}'"),
            ),
            AppError::Archive(err) => {
                tracing::error!(error = %err, "Archive error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a remote-client error into an HTTP status, error code, and
/// message.
///
/// - A missing credential or unusable base URL maps to 500 with an
///   explanatory message.
/// - Transport failures map to 500 with a generic message.
/// - A success response without a job id maps to 500 naming the operation.
fn classify_remote_error(err: &ImagineApiError) -> (StatusCode, &'static str, String) {
    match err {
        ImagineApiError::NotConfigured => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIGURATION_ERROR",
            "API key not configured. Please set IMAGINEPRO_API_KEY environment variable."
                .to_string(),
        ),
        ImagineApiError::InvalidBaseUrl(_) => {
            tracing::error!(error = %err, "Remote API misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                err.to_string(),
            )
        }
        err if err.is_transport() => {
            tracing::error!(error = %err, "Remote API call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                UPSTREAM_FAILURE_MESSAGE.to_string(),
            )
        }
        _ => {
            tracing::error!(error = %err, "Remote API returned no job id");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                err.to_string(),
            )
        }
    }
}
