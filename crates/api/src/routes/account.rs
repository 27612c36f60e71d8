use axum::routing::get;
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// ```text
/// GET    /api/credits                    credits
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/api/credits", get(account::credits))
}
