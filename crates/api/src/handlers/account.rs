//! Account credits lookup.
//!
//! This endpoint keeps its own response shape (`success` flag plus a zero
//! `creditsExtra` on failure) because the browser's credit badge reads it
//! directly, so it does not go through [`AppError`](crate::error::AppError).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use novagen_client::api::{AccountInfo, ImagineApiError};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub account: AccountInfo,
}

/// GET /api/credits
pub async fn credits(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.api.account_info().await {
        Ok(account) => {
            let body = CreditsResponse {
                success: true,
                account,
            };
            (StatusCode::OK, Json(json!(body)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch account credits");
            let message = match e {
                ImagineApiError::NotConfigured => "API key not configured",
                _ => "Failed to fetch account credits",
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": message,
                    "creditsExtra": 0,
                })),
            )
        }
    }
}
