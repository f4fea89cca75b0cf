//! Logging initialization.
//!
//! This service runs as a single process with no distributed-tracing
//! requirement, so only the plain `tracing-subscriber` layer is set up (see
//! DESIGN.md for the dropped OpenTelemetry/OTLP layer the teacher carries for
//! its multi-service mesh).

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Respects `RUST_LOG`, defaulting
/// to `info` when unset or invalid.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("tracing initialized");
}
