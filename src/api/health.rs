//! Health and status endpoints for the Read API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::queue::QueueState;
use crate::server::state::ReadState;

/// GET /health - liveness probe. A 200-class response with the literal body
/// `"OK"`; richer status detail lives at `/status`.
pub async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub queue_state: String,
    pub worker_count: usize,
    pub queue_size: usize,
}

/// GET /status - operational detail beyond the plain liveness probe.
pub async fn status(State(state): State<ReadState>) -> Json<StatusResponse> {
    let queue_state = match state.queue.state() {
        QueueState::Constructed => "constructed",
        QueueState::Running => "running",
        QueueState::Stopping => "stopping",
        QueueState::Stopped => "stopped",
    };

    Json(StatusResponse {
        status: if queue_state == "running" { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        queue_state: queue_state.to_string(),
        worker_count: state.queue.worker_count(),
        queue_size: state.queue.queue_len(),
    })
}
