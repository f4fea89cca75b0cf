//! End-to-end scenarios against the dispatch front-end and delivery queue,
//! exercising fan-out, retry, retry exhaustion, backpressure, and shutdown
//! without going through HTTP.

use std::sync::Arc;
use std::time::Duration;

use fanout_notify::dispatch::DispatchFrontEnd;
use fanout_notify::metrics::MetricsAggregator;
use fanout_notify::queue::{DeliveryQueue, ScriptedSource};
use fanout_notify::store::{NotificationStatus, NotificationStore, User};

async fn seeded_store(author_followers: &[&str]) -> Arc<NotificationStore> {
    let store = Arc::new(NotificationStore::new());
    let mut author = User::new("author", "Author");
    author.followers = author_followers.iter().map(|s| s.to_string()).collect();
    store.put_user(author).await;
    for id in author_followers {
        store.put_user(User::new(*id, *id)).await;
    }
    store
}

#[tokio::test]
async fn happy_path_fans_out_to_every_follower_and_delivers() {
    let store = seeded_store(&["bob", "carol", "dave"]).await;
    let metrics = Arc::new(MetricsAggregator::new());
    let source = Arc::new(ScriptedSource::always_succeeds());
    let queue = Arc::new(DeliveryQueue::new(10, 3, Duration::from_millis(5), 3, store.clone(), metrics, source));
    let dispatch = DispatchFrontEnd::new(store.clone(), queue.clone());

    let result = dispatch.publish_post(None, "author".to_string(), "hello followers".to_string()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.notifications_queued, 3);

    tokio::time::sleep(Duration::from_millis(100)).await;
    for follower in ["bob", "carol", "dave"] {
        let history = store.get_user_notifications(follower, 10).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, NotificationStatus::Delivered);
    }

    queue.stop().await;
}

#[tokio::test]
async fn scripted_failure_then_success_recovers_via_retry() {
    let store = seeded_store(&["bob"]).await;
    let metrics = Arc::new(MetricsAggregator::new());
    // First attempt fails, then the retry sleeper re-submits and the second
    // attempt (and everything after) succeeds.
    let source = Arc::new(ScriptedSource::new(Duration::from_millis(1), vec![true], false));
    let queue = Arc::new(DeliveryQueue::new(10, 2, Duration::from_millis(5), 3, store.clone(), metrics, source));
    let dispatch = DispatchFrontEnd::new(store.clone(), queue.clone());

    dispatch.publish_post(None, "author".to_string(), "retry me".to_string()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let history = store.get_user_notifications("bob", 10).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, NotificationStatus::Delivered);
    assert_eq!(history[0].attempts, 1);

    queue.stop().await;
}

#[tokio::test]
async fn retries_exhaust_into_permanent_failure() {
    let store = seeded_store(&["bob"]).await;
    let metrics = Arc::new(MetricsAggregator::new());
    let source = Arc::new(ScriptedSource::always_fails());
    let queue = Arc::new(DeliveryQueue::new(10, 2, Duration::from_millis(5), 3, store.clone(), metrics, source));
    let dispatch = DispatchFrontEnd::new(store.clone(), queue.clone());

    dispatch.publish_post(None, "author".to_string(), "never lands".to_string()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let history = store.get_user_notifications("bob", 10).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, NotificationStatus::Failed);
    assert_eq!(history[0].attempts, 4);

    queue.stop().await;
}

#[tokio::test]
async fn backpressure_drops_enqueue_beyond_capacity() {
    let store = seeded_store(&["u0", "u1", "u2", "u3", "u4"]).await;
    let metrics = Arc::new(MetricsAggregator::new());
    // A long processing delay keeps workers busy long enough that the buffer
    // fills before anything drains.
    let source = Arc::new(ScriptedSource::new(Duration::from_secs(5), Vec::new(), false));
    let queue = Arc::new(DeliveryQueue::new(2, 1, Duration::from_millis(5), 3, store.clone(), metrics, source));
    let dispatch = DispatchFrontEnd::new(store.clone(), queue.clone());

    let result = dispatch.publish_post(None, "author".to_string(), "overflow".to_string()).await.unwrap();
    assert!(result.notifications_queued <= 3);

    queue.stop().await;
}

#[tokio::test]
async fn stop_during_long_delay_abandons_in_buffer_work_without_hanging() {
    let store = seeded_store(&["bob"]).await;
    let metrics = Arc::new(MetricsAggregator::new());
    let source = Arc::new(ScriptedSource::new(Duration::from_secs(30), Vec::new(), false));
    let queue = DeliveryQueue::new(10, 2, Duration::from_millis(5), 3, store.clone(), metrics, source);

    queue.submit(fanout_notify::store::Notification::new_queued("bob", "p1", "author", "hi"));
    tokio::time::timeout(Duration::from_secs(2), queue.stop()).await.expect("stop should return promptly, not wait out the in-flight delay");
}

#[tokio::test]
async fn metrics_snapshot_reflects_activity() {
    let store = seeded_store(&["bob", "carol"]).await;
    let metrics = Arc::new(MetricsAggregator::new());
    let source = Arc::new(ScriptedSource::always_succeeds());
    let queue = Arc::new(DeliveryQueue::new(10, 2, Duration::from_millis(5), 3, store.clone(), metrics.clone(), source));
    let dispatch = DispatchFrontEnd::new(store.clone(), queue.clone());

    dispatch.publish_post(None, "author".to_string(), "metrics check".to_string()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = metrics.snapshot(queue.queue_len(), queue.worker_count()).await;
    assert_eq!(snapshot.total_sent, 2);
    assert_eq!(snapshot.worker_count, 2);

    queue.stop().await;
}
