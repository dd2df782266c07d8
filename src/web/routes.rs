//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Search routes
        .route("/search", get(handlers::search))
        .route("/news", get(handlers::news))
        .route("/fetch", get(handlers::fetch))
        .route("/deep", get(handlers::deep_search))
        // Provider selection
        .route("/providers", get(handlers::providers))
        .route("/providers/active", put(handlers::set_active))
        .route("/providers/active/reset", post(handlers::reset_active))
        .route("/providers/active/select", post(handlers::select_only))
        .route("/context", delete(handlers::end_context))
        // Service routes
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        // Add middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        // Add state
        .with_state(state)
}
