//! A single delivery worker: pulls one notification at a time off the shared
//! buffer, attempts delivery, and schedules a retry on synthetic failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::metrics::MetricsAggregator;
use crate::store::{Notification, NotificationStatus, NotificationStore};

use super::source::DeliverySource;
use super::RetryRegistry;

/// Receiver side of the shared buffer. Multiple workers consume from the same
/// channel by taking turns through the mutex — the bounded-channel analogue
/// of a thread pool sharing one MPMC queue.
pub type SharedReceiver = Arc<AsyncMutex<mpsc::Receiver<Notification>>>;

pub struct WorkerContext {
    pub store: Arc<NotificationStore>,
    pub metrics: Arc<MetricsAggregator>,
    pub source: Arc<dyn DeliverySource>,
    pub sender: mpsc::Sender<Notification>,
    pub retry_registry: Arc<RetryRegistry>,
    pub initial_backoff: Duration,
    pub max_retries: u32,
}

/// Runs the worker loop until the shutdown signal fires or the buffer closes.
pub async fn run_worker(id: usize, receiver: SharedReceiver, mut shutdown: broadcast::Receiver<()>, ctx: Arc<WorkerContext>) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::info!(worker_id = id, "worker exiting on shutdown signal");
                break;
            }
            item = async { receiver.lock().await.recv().await } => {
                match item {
                    Some(notification) => process_one(notification, &ctx).await,
                    None => {
                        tracing::info!(worker_id = id, "worker exiting: buffer closed");
                        break;
                    }
                }
            }
        }
    }
}

async fn process_one(mut notification: Notification, ctx: &Arc<WorkerContext>) {
    let start = Instant::now();

    tokio::time::sleep(ctx.source.processing_delay()).await;

    if ctx.source.roll_failure() {
        handle_failure(&mut notification, ctx).await;
        return;
    }

    notification.status = NotificationStatus::Delivered;
    if let Err(err) = ctx.store.update_notification(notification.clone()).await {
        tracing::error!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            error = %err,
            "failed to persist delivered status"
        );
    }
    ctx.metrics.record_delivered(start.elapsed()).await;
    tracing::debug!(
        notification_id = %notification.id,
        user_id = %notification.user_id,
        status = notification.status.as_str(),
        "notification delivered"
    );
}

async fn handle_failure(notification: &mut Notification, ctx: &Arc<WorkerContext>) {
    ctx.metrics.record_failed_attempt();
    notification.attempts += 1;

    if notification.attempts <= ctx.max_retries {
        let backoff = ctx.initial_backoff * 2u32.pow(notification.attempts - 1);
        notification.status = NotificationStatus::Retrying;

        if let Err(err) = ctx.store.update_notification(notification.clone()).await {
            tracing::error!(
                notification_id = %notification.id,
                user_id = %notification.user_id,
                error = %err,
                "failed to persist retrying status"
            );
        }
        ctx.metrics.record_retry_scheduled();

        tracing::info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            attempt = notification.attempts,
            backoff_ms = backoff.as_millis() as u64,
            "scheduling retry"
        );

        spawn_retry_sleeper(notification.clone(), backoff, ctx.clone());
    } else {
        notification.status = NotificationStatus::Failed;
        if let Err(err) = ctx.store.update_notification(notification.clone()).await {
            tracing::error!(
                notification_id = %notification.id,
                user_id = %notification.user_id,
                error = %err,
                "failed to persist failed status"
            );
        }
        tracing::warn!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            attempts = notification.attempts,
            "notification permanently failed"
        );
    }
}

/// Spawns a tracked sleeper that re-submits `notification` to the buffer once
/// `backoff` has elapsed. Tracked in the worker pool's retry registry so
/// shutdown can join it instead of leaving it as a fire-and-forget task.
fn spawn_retry_sleeper(notification: Notification, backoff: Duration, ctx: Arc<WorkerContext>) {
    let registry = ctx.retry_registry.clone();
    let handle: JoinHandle<()> = tokio::spawn(async move {
        tokio::time::sleep(backoff).await;
        if ctx.sender.try_send(notification.clone()).is_err() {
            tracing::warn!(
                notification_id = %notification.id,
                user_id = %notification.user_id,
                "retry dropped: delivery buffer full"
            );
        }
    });
    registry.track(handle);
}
