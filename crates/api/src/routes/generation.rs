//! Route definitions for the job lifecycle.
//!
//! ```text
//! POST   /generate                       generate
//! GET    /status/{message_id}            status
//! POST   /button                         button
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generation::generate))
        .route("/status/{message_id}", get(generation::status))
        .route("/button", post(generation::button))
}
