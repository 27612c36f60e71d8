//! Handlers for the job lifecycle: submit, poll, derive.
//!
//! Routes:
//! - `POST /generate`              submit a prompt
//! - `GET  /status/{message_id}`   poll once; archive the images on `DONE`
//! - `POST /button`                upscale / variation of an existing job
//!
//! Polling is driven by the caller. Each status request performs exactly
//! one remote fetch.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use novagen_client::api::ImagineApiError;
use novagen_core::button::{action_prompt, ButtonCode};
use novagen_core::generation::validate_prompt;
use novagen_core::job::JobStatus;
use novagen_core::naming::validate_message_id;
use novagen_core::normalize::normalize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message_id: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Prompt to store in the archive record if this poll completes the job.
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub progress: String,
    /// Local archive paths when archiving succeeded, else the remote URLs.
    pub images: Vec<String>,
    pub raw_data: Value,
}

#[derive(Debug, Deserialize)]
pub struct ButtonRequest {
    #[serde(rename = "messageId", default)]
    pub message_id: String,
    #[serde(default)]
    pub button: String,
    /// Prompt of the original job, used for the derived description.
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ButtonResponse {
    pub message_id: String,
    pub prompt: String,
    pub button: ButtonCode,
    pub original_message_id: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /generate
///
/// Validates the prompt and submits it. A remote response without a job
/// id is reported as a failure rather than an empty id.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(input) = payload.map_err(|_| AppError::BadRequest("Invalid request format".into()))?;
    let prompt = validate_prompt(&input.prompt, state.config.generation.max_prompt_length)?;

    let message_id = state
        .api
        .submit(&prompt)
        .await?
        .ok_or(ImagineApiError::MissingJobId { operation: "imagine" })?;

    Ok(Json(GenerateResponse { message_id, prompt }))
}

/// GET /status/{message_id}?prompt=...
///
/// Fetches and normalizes the job once. On `DONE` with images the job is
/// archived; archive trouble never fails the request, the remote URLs are
/// returned instead. Ids that could escape their path segment are refused
/// before anything is sent upstream.
pub async fn status(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<StatusResponse>> {
    validate_message_id(&message_id)?;
    let raw = state.api.fetch_status(&message_id).await?;
    let normalized = normalize(&raw);

    let mut images = normalized.image_urls;
    if !images.is_empty() {
        let local = state
            .writer
            .persist(&message_id, &images, &query.prompt, &raw)
            .await;
        if !local.is_empty() {
            images = local;
        }
    }

    Ok(Json(StatusResponse {
        status: normalized.status,
        progress: normalized.progress,
        images,
        raw_data: raw,
    }))
}

/// POST /button
///
/// Requires a non-empty `messageId` and a button code of the form
/// `U1`..`U4` / `V1`..`V4`.
pub async fn button(
    State(state): State<AppState>,
    payload: Result<Json<ButtonRequest>, JsonRejection>,
) -> AppResult<Json<ButtonResponse>> {
    let Json(input) = payload.map_err(|_| AppError::BadRequest("Invalid request format".into()))?;

    let original_message_id = input.message_id.trim();
    if original_message_id.is_empty() || input.button.trim().is_empty() {
        return Err(AppError::BadRequest("Missing messageId or button".into()));
    }
    let button = ButtonCode::parse(&input.button)?;

    let outcome = state.api.apply_button(original_message_id, &button).await?;

    Ok(Json(ButtonResponse {
        message_id: outcome.message_id,
        prompt: action_prompt(button.as_str(), &input.prompt),
        button,
        original_message_id: original_message_id.to_string(),
    }))
}
