pub mod auth;
pub mod comments;
pub mod likes;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Assemble the full API surface. Layers (trace, CORS, timeout) are applied
/// by the caller so tests can drive this router bare.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(comments::router())
        .merge(likes::router())
}

async fn health() -> &'static str {
    "ok"
}
