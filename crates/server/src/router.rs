//! HTTP router construction for the synchronous gateway.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::GatewayState;

/// Build the gateway router with all routes and middleware.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/tools", get(api::list_tools))
        .route("/tools/execute", post(api::execute_tool))
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
