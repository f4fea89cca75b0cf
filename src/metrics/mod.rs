//! Metrics aggregator for the delivery pipeline.
//!
//! Exposes counters and a derived average latency, readable concurrently with
//! worker updates. Also mirrors the same events onto Prometheus collectors for
//! operational scraping, separate from the plain-Rust snapshot the Read API's
//! `getMetrics` query is built from.

mod prometheus_metrics;
mod ring;

pub use prometheus_metrics::encode_prometheus_metrics;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use ring::LatencyRing;

/// Capacity of the rolling delivery-latency sample. The original unbounded
/// `Vec` is a documented deficiency; this implementation bounds it instead.
const LATENCY_SAMPLE_CAPACITY: usize = 1000;

pub struct MetricsAggregator {
    total_sent: AtomicU64,
    failed_attempts: AtomicU64,
    total_retries: AtomicU64,
    latencies: RwLock<LatencyRing>,
}

/// A point-in-time read of all metric fields, taken under the metrics lock.
/// Concurrent writers may update fields between the counter loads and the
/// latency-lock acquisition, so this is not a single atomic instant across all
/// fields — acceptable for an operational metrics surface.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_sent: u64,
    pub failed_attempts: u64,
    pub total_retries: u64,
    pub avg_delivery_time: String,
    pub queue_size: usize,
    pub worker_count: usize,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self {
            total_sent: AtomicU64::new(0),
            failed_attempts: AtomicU64::new(0),
            total_retries: AtomicU64::new(0),
            latencies: RwLock::new(LatencyRing::new(LATENCY_SAMPLE_CAPACITY)),
        }
    }

    pub fn record_failed_attempt(&self) {
        self.failed_attempts.fetch_add(1, Ordering::Relaxed);
        prometheus_metrics::FAILED_ATTEMPTS_TOTAL.inc();
    }

    pub fn record_retry_scheduled(&self) {
        self.total_retries.fetch_add(1, Ordering::Relaxed);
        prometheus_metrics::RETRIES_TOTAL.inc();
    }

    pub async fn record_delivered(&self, elapsed: Duration) {
        self.total_sent.fetch_add(1, Ordering::Relaxed);
        prometheus_metrics::SENT_TOTAL.inc();
        prometheus_metrics::DELIVERY_LATENCY_SECONDS.observe(elapsed.as_secs_f64());
        self.latencies.write().await.push(elapsed);
    }

    /// Take a snapshot under the metrics lock. `queue_size` and `worker_count`
    /// are supplied by the caller since the aggregator does not own the queue.
    pub async fn snapshot(&self, queue_size: usize, worker_count: usize) -> MetricsSnapshot {
        let avg = self.latencies.read().await.average();
        prometheus_metrics::QUEUE_SIZE.set(queue_size as i64);
        prometheus_metrics::WORKER_COUNT.set(worker_count as i64);

        MetricsSnapshot {
            total_sent: self.total_sent.load(Ordering::Relaxed),
            failed_attempts: self.failed_attempts.load(Ordering::Relaxed),
            total_retries: self.total_retries.load(Ordering::Relaxed),
            avg_delivery_time: humanize(avg),
            queue_size,
            worker_count,
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn humanize(d: Option<Duration>) -> String {
    match d {
        Some(d) => format!("{d:?}"),
        None => "0s".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_reports_zero_average_when_empty() {
        let metrics = MetricsAggregator::new();
        let snap = metrics.snapshot(0, 10).await;
        assert_eq!(snap.avg_delivery_time, "0s");
        assert_eq!(snap.total_sent, 0);
        assert_eq!(snap.worker_count, 10);
    }

    #[tokio::test]
    async fn counters_accumulate() {
        let metrics = MetricsAggregator::new();
        metrics.record_failed_attempt();
        metrics.record_failed_attempt();
        metrics.record_retry_scheduled();
        metrics.record_delivered(Duration::from_millis(20)).await;

        let snap = metrics.snapshot(5, 10).await;
        assert_eq!(snap.failed_attempts, 2);
        assert_eq!(snap.total_retries, 1);
        assert_eq!(snap.total_sent, 1);
        assert_eq!(snap.queue_size, 5);
    }
}
