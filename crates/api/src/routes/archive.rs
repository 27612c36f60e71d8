//! Route definitions for browsing and cleaning up the local archive.
//!
//! ```text
//! GET    /api/generations                list_generations
//! DELETE /api/generations/{message_id}   delete_generation
//! GET    /api/gallery/images             gallery_images
//! ```

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::archive;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/generations", get(archive::list_generations))
        .route(
            "/api/generations/{message_id}",
            delete(archive::delete_generation),
        )
        .route("/api/gallery/images", get(archive::gallery_images))
}
