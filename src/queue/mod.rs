//! Bounded delivery queue: a fixed-size pool of workers consuming from a
//! single shared buffer, with a tracked retry-sleeper registry and a
//! start/stop lifecycle.

mod source;
mod worker;

pub use source::{DeliverySource, RandomSource, ScriptedSource};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::metrics::MetricsAggregator;
use crate::store::{Notification, NotificationStore};
use worker::WorkerContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Constructed,
    Running,
    Stopping,
    Stopped,
}

/// Tracks in-flight retry sleepers so shutdown can join them instead of
/// leaving them as untracked fire-and-forget tasks.
pub struct RetryRegistry {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl RetryRegistry {
    fn new() -> Self {
        Self {
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn track(&self, handle: JoinHandle<()>) {
        self.handles.lock().unwrap().push(handle);
    }

    /// Awaits every tracked sleeper, draining the registry. Called during
    /// Stop, after the cancellation signal has gone out, so no new sleeper
    /// attempts to submit to a buffer that is about to close.
    async fn join_all(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.handles.lock().unwrap());
        for handle in handles {
            let _ = handle.await;
        }
    }
}

pub struct DeliveryQueue {
    sender: mpsc::Sender<Notification>,
    shutdown_tx: broadcast::Sender<()>,
    worker_handles: Mutex<Vec<JoinHandle<()>>>,
    retry_registry: Arc<RetryRegistry>,
    state: Mutex<QueueState>,
    worker_count: usize,
}

impl DeliveryQueue {
    /// Values ≤0 for `worker_count` are replaced by the default of 10.
    pub fn new(
        capacity: usize,
        worker_count: usize,
        initial_backoff: Duration,
        max_retries: u32,
        store: Arc<NotificationStore>,
        metrics: Arc<MetricsAggregator>,
        source: Arc<dyn DeliverySource>,
    ) -> Self {
        let worker_count = if worker_count == 0 { 10 } else { worker_count };
        let (sender, receiver) = mpsc::channel(capacity);
        let (shutdown_tx, _) = broadcast::channel(worker_count.max(1));
        let retry_registry = Arc::new(RetryRegistry::new());

        let ctx = Arc::new(WorkerContext {
            store,
            metrics,
            source,
            sender: sender.clone(),
            retry_registry: retry_registry.clone(),
            initial_backoff,
            max_retries,
        });

        let shared_receiver: worker::SharedReceiver = Arc::new(AsyncMutex::new(receiver));

        let mut worker_handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let receiver = shared_receiver.clone();
            let shutdown_rx = shutdown_tx.subscribe();
            let ctx = ctx.clone();
            worker_handles.push(tokio::spawn(worker::run_worker(id, receiver, shutdown_rx, ctx)));
        }

        Self {
            sender,
            shutdown_tx,
            worker_handles: Mutex::new(worker_handles),
            retry_registry,
            state: Mutex::new(QueueState::Running),
            worker_count,
        }
    }

    pub fn state(&self) -> QueueState {
        *self.state.lock().unwrap()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Submits one notification to the buffer. Returns `false` if the buffer
    /// is full or the queue has stopped accepting work — the submission is
    /// dropped, never blocked on.
    pub fn submit(&self, notification: Notification) -> bool {
        self.sender.try_send(notification).is_ok()
    }

    /// Submits as many of `notifications` as the buffer has room for,
    /// returning the count actually accepted.
    pub fn submit_bulk(&self, notifications: Vec<Notification>) -> usize {
        let mut accepted = 0;
        for notification in notifications {
            if self.submit(notification) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Current number of items waiting in the buffer.
    pub fn queue_len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Cancels all workers, waits for them to exit their loops, joins every
    /// tracked retry sleeper, then closes the buffer. In-buffer items at
    /// cancellation time are discarded, not drained.
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state != QueueState::Running {
                return;
            }
            *state = QueueState::Stopping;
        }

        let _ = self.shutdown_tx.send(());

        let handles: Vec<_> = std::mem::take(&mut *self.worker_handles.lock().unwrap());
        for handle in handles {
            let _ = handle.await;
        }

        self.retry_registry.join_all().await;

        *self.state.lock().unwrap() = QueueState::Stopped;
        tracing::info!("delivery queue stopped");
    }
}
