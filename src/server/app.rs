use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::state::{IngestState, ReadState};

/// Maximum request body size for the publish endpoint (64 KB).
const MAX_BODY_SIZE: usize = 64 * 1024;

/// The ingest listener: a single RPC for publishing a post and fanning it out.
pub fn build_ingest_router(state: IngestState) -> Router {
    Router::new()
        .route("/v1/posts", post(crate::api::publish_post))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(open_cors())
        .with_state(state)
}

/// The Read API / operational listener: notification history, health, and metrics.
pub fn build_read_router(state: ReadState) -> Router {
    Router::new()
        .route("/health", get(crate::api::health))
        .route("/status", get(crate::api::status))
        .route("/metrics", get(crate::api::prometheus_metrics))
        .route("/v1/users", get(crate::api::get_users))
        .route("/v1/users/{user_id}/notifications", get(crate::api::get_notifications))
        .route("/v1/stats", get(crate::api::get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(open_cors())
        .with_state(state)
}

/// No authentication or per-tenant origin list is in scope for this service;
/// both listeners are CORS-open.
fn open_cors() -> CorsLayer {
    CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}
