use std::sync::Arc;

use crate::config::{PipelineConfig, Settings};
use crate::dispatch::DispatchFrontEnd;
use crate::metrics::MetricsAggregator;
use crate::queue::{DeliveryQueue, RandomSource};
use crate::store::NotificationStore;

/// Shared state for the ingest RPC listener.
#[derive(Clone)]
pub struct IngestState {
    pub dispatch: Arc<DispatchFrontEnd>,
}

/// Shared state for the Read API / operational listener.
#[derive(Clone)]
pub struct ReadState {
    pub store: Arc<NotificationStore>,
    pub metrics: Arc<MetricsAggregator>,
    pub queue: Arc<DeliveryQueue>,
    pub read_limit: usize,
}

/// The fully-assembled pipeline: the pieces both listeners and the shutdown
/// sequence need a handle to.
pub struct Pipeline {
    pub store: Arc<NotificationStore>,
    pub metrics: Arc<MetricsAggregator>,
    pub queue: Arc<DeliveryQueue>,
    pub dispatch: Arc<DispatchFrontEnd>,
}

impl Pipeline {
    pub fn new(pipeline_config: &PipelineConfig) -> Self {
        let store = Arc::new(NotificationStore::new());
        let metrics = Arc::new(MetricsAggregator::new());
        let source = Arc::new(RandomSource::new(
            pipeline_config.processing_delay_min_ms,
            pipeline_config.processing_delay_max_ms,
            pipeline_config.failure_rate,
        ));

        let queue = Arc::new(DeliveryQueue::new(
            pipeline_config.queue_capacity,
            pipeline_config.default_worker_count,
            std::time::Duration::from_millis(pipeline_config.initial_backoff_ms),
            pipeline_config.max_retries,
            store.clone(),
            metrics.clone(),
            source,
        ));

        let dispatch = Arc::new(DispatchFrontEnd::new(store.clone(), queue.clone()));

        Self {
            store,
            metrics,
            queue,
            dispatch,
        }
    }

    pub fn ingest_state(&self) -> IngestState {
        IngestState {
            dispatch: self.dispatch.clone(),
        }
    }

    pub fn read_state(&self, settings: &Settings) -> ReadState {
        ReadState {
            store: self.store.clone(),
            metrics: self.metrics.clone(),
            queue: self.queue.clone(),
            read_limit: settings.read.read_limit,
        }
    }
}
