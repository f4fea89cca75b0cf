//! Prometheus metrics endpoint for the Read API.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::metrics::encode_prometheus_metrics;
use crate::server::state::ReadState;

/// GET /metrics - Prometheus text-exposition endpoint. Touches the snapshot
/// first so the gauges it mirrors into (queue size, worker count) are current
/// as of this scrape.
pub async fn prometheus_metrics(State(state): State<ReadState>) -> impl IntoResponse {
    state.metrics.snapshot(state.queue.queue_len(), state.queue.worker_count()).await;

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        encode_prometheus_metrics(),
    )
}
