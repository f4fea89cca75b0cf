//! Graceful shutdown for the fan-out pipeline.
//!
//! Phased the way the teacher's connection-draining shutdown is: stop
//! accepting new work first, then drain what is already in flight, each phase
//! bounded by its own timeout so shutdown cannot hang forever.

use std::time::Duration;

use tokio::time::timeout;

use crate::queue::DeliveryQueue;

/// Run the shutdown sequence: the caller has already stopped accepting new
/// ingest requests (dropped the ingest listener) before calling this. Stops
/// the delivery queue's workers and joins any in-flight retry sleepers,
/// bounded by `drain_timeout`.
#[tracing::instrument(skip(queue))]
pub async fn shutdown_pipeline(queue: &DeliveryQueue, drain_timeout: Duration) -> ShutdownResult {
    let start = std::time::Instant::now();

    tracing::info!("shutdown: stopping delivery queue");
    let drained = match timeout(drain_timeout, queue.stop()).await {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!(timeout_ms = drain_timeout.as_millis(), "shutdown: drain timed out, some in-flight work may be abandoned");
            false
        }
    };

    let result = ShutdownResult {
        drained,
        duration: start.elapsed(),
    };

    tracing::info!(drained = result.drained, duration_ms = result.duration.as_millis(), "shutdown complete");
    result
}

#[derive(Debug)]
pub struct ShutdownResult {
    pub drained: bool,
    pub duration: Duration,
}
