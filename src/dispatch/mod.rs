//! Dispatch front-end: turns an accepted post into a persisted post plus one
//! persisted, queued notification per follower, then bulk-hands them to the
//! delivery queue.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::queue::DeliveryQueue;
use crate::store::{Notification, NotificationStore, Post, StoreError};

pub struct DispatchFrontEnd {
    store: Arc<NotificationStore>,
    queue: Arc<DeliveryQueue>,
}

pub struct PublishResult {
    pub post_id: String,
    pub notifications_queued: usize,
    pub success: bool,
}

impl DispatchFrontEnd {
    pub fn new(store: Arc<NotificationStore>, queue: Arc<DeliveryQueue>) -> Self {
        Self { store, queue }
    }

    /// Accepts a post: resolves the author's followers first (the author must
    /// exist; `get_followers`'s `NotFound` propagates as an error rather than
    /// being treated as zero followers), then mints an ID and timestamp if
    /// missing, persists the post, constructs and persists one queued
    /// notification per follower, then bulk-enqueues them. A follower whose
    /// notification fails to persist is skipped — fan-out tolerates partial
    /// failure rather than aborting the whole post.
    pub async fn publish_post(&self, id: Option<String>, author_id: String, content: String) -> Result<PublishResult, StoreError> {
        let followers = self.store.get_followers(&author_id).await?;

        let post = Post {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            author_id: author_id.clone(),
            content: content.clone(),
            created_at: Utc::now(),
        };
        self.store.save_post(post.clone()).await;

        let mut pending = Vec::with_capacity(followers.len());
        for follower in followers {
            let notification = Notification::new_queued(follower.id.clone(), post.id.clone(), author_id.clone(), content.clone());
            self.store.save_notification(notification.clone()).await;
            pending.push(notification);
        }

        let submitted = pending.len();
        let accepted = self.queue.submit_bulk(pending);
        if accepted < submitted {
            tracing::warn!(post_id = %post.id, submitted, accepted, "some notifications dropped at enqueue: delivery queue full");
        }

        Ok(PublishResult {
            post_id: post.id,
            notifications_queued: accepted,
            success: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsAggregator;
    use crate::queue::ScriptedSource;
    use crate::store::User;
    use std::time::Duration;

    async fn seeded(followers: &[&str]) -> (Arc<NotificationStore>, String) {
        let store = Arc::new(NotificationStore::new());
        let mut author = User::new("author", "Author");
        author.followers = followers.iter().map(|s| s.to_string()).collect();
        store.put_user(author).await;
        for id in followers {
            store.put_user(User::new(*id, *id)).await;
        }
        (store, "author".to_string())
    }

    #[tokio::test]
    async fn publish_fans_out_one_notification_per_follower() {
        let (store, author_id) = seeded(&["u2", "u3", "u4"]).await;
        let metrics = Arc::new(MetricsAggregator::new());
        let source = Arc::new(ScriptedSource::always_succeeds());
        let queue = Arc::new(DeliveryQueue::new(10, 2, Duration::from_millis(5), 3, store.clone(), metrics, source));
        let front_end = DispatchFrontEnd::new(store.clone(), queue.clone());

        let result = front_end.publish_post(None, author_id, "hi".to_string()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.notifications_queued, 3);

        for follower in ["u2", "u3", "u4"] {
            let list = store.get_user_notifications(follower, 10).await;
            assert_eq!(list.len(), 1);
        }
        queue.stop().await;
    }

    #[tokio::test]
    async fn publish_with_nonexistent_author_propagates_not_found() {
        let store = Arc::new(NotificationStore::new());
        let metrics = Arc::new(MetricsAggregator::new());
        let source = Arc::new(ScriptedSource::always_succeeds());
        let queue = Arc::new(DeliveryQueue::new(10, 2, Duration::from_millis(5), 3, store.clone(), metrics, source));
        let front_end = DispatchFrontEnd::new(store.clone(), queue.clone());

        let result = front_end.publish_post(None, "ghost".to_string(), "hi".to_string()).await;
        assert!(matches!(result, Err(StoreError::UserNotFound(id)) if id == "ghost"));
        queue.stop().await;
    }

    #[tokio::test]
    async fn publish_with_nonexistent_author_leaves_no_orphan_post() {
        let store = Arc::new(NotificationStore::new());
        let metrics = Arc::new(MetricsAggregator::new());
        let source = Arc::new(ScriptedSource::always_succeeds());
        let queue = Arc::new(DeliveryQueue::new(10, 2, Duration::from_millis(5), 3, store.clone(), metrics, source));
        let front_end = DispatchFrontEnd::new(store.clone(), queue.clone());

        let result = front_end.publish_post(Some("orphan-check".to_string()), "ghost".to_string(), "hi".to_string()).await;
        assert!(result.is_err());
        assert!(store.get_post("orphan-check").await.is_err());
        queue.stop().await;
    }
}
