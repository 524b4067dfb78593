//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // MCP transport
        .route("/mcp", post(handlers::mcp))
        .route("/:api_key/mcp", post(handlers::mcp_with_key))
        // API routes
        .route("/health", get(handlers::health));

    if state.settings.server.enable_admin {
        router = router.route("/admin/engines/rebuild", post(handlers::rebuild_engines));
    }

    router
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}
