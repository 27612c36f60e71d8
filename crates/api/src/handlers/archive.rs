//! Handlers for the local archive.
//!
//! Routes:
//! - `GET    /api/generations`                newest first
//! - `DELETE /api/generations/{message_id}`   remove one archived generation
//! - `GET    /api/gallery/images`             every archived image, flattened

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use novagen_core::error::CoreError;
use novagen_core::record::{GalleryImage, GenerationRecord};

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerationsResponse {
    pub generations: Vec<GenerationRecord>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    pub images: Vec<GalleryImage>,
}

/// GET /api/generations
pub async fn list_generations(State(state): State<AppState>) -> AppResult<Json<GenerationsResponse>> {
    let generations = state.index.list_all().await?;
    Ok(Json(GenerationsResponse { generations }))
}

/// DELETE /api/generations/{message_id}
///
/// Deleting an id that is not (or no longer) archived is a 404.
pub async fn delete_generation(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    if !state.index.delete(&message_id).await? {
        return Err(CoreError::NotFound {
            entity: "Generation",
            id: message_id,
        }
        .into());
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Generation deleted successfully",
    }))
}

/// GET /api/gallery/images
pub async fn gallery_images(State(state): State<AppState>) -> AppResult<Json<GalleryResponse>> {
    let images = state.index.gallery().await?;
    Ok(Json(GalleryResponse { images }))
}
