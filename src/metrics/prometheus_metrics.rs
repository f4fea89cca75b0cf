//! Prometheus mirror of the pipeline's counters, scraped from the Read API's
//! `/metrics` endpoint alongside the JSON `getMetrics` query.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, IntCounter, IntGauge, TextEncoder, register_histogram, register_int_counter,
    register_int_gauge,
};

const METRIC_PREFIX: &str = "fanout";

lazy_static! {
    pub static ref SENT_TOTAL: IntCounter = register_int_counter!(
        format!("{METRIC_PREFIX}_notifications_sent_total"),
        "Total notifications successfully delivered"
    )
    .unwrap();
    pub static ref FAILED_ATTEMPTS_TOTAL: IntCounter = register_int_counter!(
        format!("{METRIC_PREFIX}_notifications_failed_total"),
        "Total delivery attempts that ended in failure, including attempts later retried"
    )
    .unwrap();
    pub static ref RETRIES_TOTAL: IntCounter = register_int_counter!(
        format!("{METRIC_PREFIX}_retries_total"),
        "Total retry attempts scheduled"
    )
    .unwrap();
    pub static ref QUEUE_SIZE: IntGauge = register_int_gauge!(
        format!("{METRIC_PREFIX}_queue_size"),
        "Current number of notifications waiting in the delivery queue"
    )
    .unwrap();
    pub static ref WORKER_COUNT: IntGauge = register_int_gauge!(
        format!("{METRIC_PREFIX}_worker_count"),
        "Current number of active delivery workers"
    )
    .unwrap();
    pub static ref DELIVERY_LATENCY_SECONDS: Histogram = register_histogram!(
        format!("{METRIC_PREFIX}_delivery_latency_seconds"),
        "Observed delivery latency per successful notification"
    )
    .unwrap();
}

/// Renders all registered collectors in Prometheus text exposition format.
pub fn encode_prometheus_metrics() -> String {
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder.encode(&metric_families, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_does_not_panic_and_includes_prefix() {
        SENT_TOTAL.inc();
        let text = encode_prometheus_metrics();
        assert!(text.contains("fanout_notifications_sent_total"));
    }
}
