pub mod account;
pub mod archive;
pub mod generation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (everything except `/output`).
///
/// Route hierarchy:
///
/// ```text
/// /health                                  service health
///
/// /generate                                submit a prompt (POST)
/// /status/{message_id}?prompt=             poll a job, archive on DONE
/// /button                                  upscale / variation (POST)
///
/// /api/generations                         list archived generations
/// /api/generations/{message_id}            delete an archived generation
/// /api/gallery/images                      every archived image, flattened
/// /api/credits                             remaining account credits
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(generation::router())
        .merge(archive::router())
        .merge(account::router())
}
