pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::domains::handlers as domain_handlers;
use crate::extraction::validation::MAX_UPLOAD_BYTES;
use crate::matching::handlers;
use crate::state::AppState;

/// Transport cap for request bodies. Kept above the upload limit so oversized
/// CVs reach validation and get a proper "too large" answer.
const MAX_REQUEST_BYTES: usize = 2 * MAX_UPLOAD_BYTES;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/matches", post(handlers::handle_analyze))
        .route("/api/v1/matches/export", post(handlers::handle_export))
        // Domain suggestions
        .route("/api/v1/domains", post(domain_handlers::handle_suggest_domains))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}
