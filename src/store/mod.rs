//! In-memory notification store.
//!
//! Sole source of truth for users, posts, and per-user notification histories.
//! A single readers-writer lock guards all three maps; reads acquire it shared,
//! mutations acquire it exclusive. Nothing here nests another lock.

mod errors;
mod types;

pub use errors::StoreError;
pub use types::{Notification, NotificationStatus, Post, User};

use std::collections::HashMap;

use tokio::sync::RwLock;
#[cfg(test)]
use uuid::Uuid;

struct StoreInner {
    users: HashMap<String, User>,
    posts: HashMap<String, Post>,
    /// recipient user_id -> append-ordered notification history
    notifications: HashMap<String, Vec<Notification>>,
}

pub struct NotificationStore {
    inner: RwLock<StoreInner>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                users: HashMap::new(),
                posts: HashMap::new(),
                notifications: HashMap::new(),
            }),
        }
    }

    /// Seed a user at initialization. Not part of the delivery-pipeline contract;
    /// the design does not require dynamic user creation.
    pub async fn put_user(&self, user: User) {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id.clone(), user);
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))
    }

    pub async fn get_all_users(&self) -> Vec<User> {
        let inner = self.inner.read().await;
        inner.users.values().cloned().collect()
    }

    /// Resolve the followers of `user_id`. Follower IDs that no longer resolve to
    /// a user are silently dropped — follower lists are a materialized cache of
    /// relations and may temporarily reference removed users.
    pub async fn get_followers(&self, user_id: &str) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let user = inner
            .users
            .get(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;

        Ok(user
            .followers
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    /// Persists a post, overwriting any existing post with the same ID.
    pub async fn save_post(&self, post: Post) {
        let mut inner = self.inner.write().await;
        inner.posts.insert(post.id.clone(), post);
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, StoreError> {
        let inner = self.inner.read().await;
        inner
            .posts
            .get(post_id)
            .cloned()
            .ok_or_else(|| StoreError::PostNotFound(post_id.to_string()))
    }

    /// Appends a notification to its recipient's history.
    pub async fn save_notification(&self, notification: Notification) {
        let mut inner = self.inner.write().await;
        inner
            .notifications
            .entry(notification.user_id.clone())
            .or_default()
            .push(notification);
    }

    /// Replaces an existing notification's mutable fields in place, matched by ID
    /// under its recipient's list.
    pub async fn update_notification(&self, notification: Notification) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let list = inner
            .notifications
            .get_mut(&notification.user_id)
            .ok_or_else(|| StoreError::NotificationNotFound(notification.id, notification.user_id.clone()))?;

        let slot = list
            .iter_mut()
            .find(|n| n.id == notification.id)
            .ok_or_else(|| StoreError::NotificationNotFound(notification.id, notification.user_id.clone()))?;

        *slot = notification;
        Ok(())
    }

    /// Up to `limit` most-recently-appended notifications for `user_id`, newest
    /// first. An unknown user yields an empty list, not an error.
    pub async fn get_user_notifications(&self, user_id: &str, limit: usize) -> Vec<Notification> {
        let inner = self.inner.read().await;
        match inner.notifications.get(user_id) {
            Some(list) => list.iter().rev().take(limit).cloned().collect(),
            None => Vec::new(),
        }
    }

    #[cfg(test)]
    pub async fn get_notification_by_id(&self, user_id: &str, id: Uuid) -> Option<Notification> {
        let inner = self.inner.read().await;
        inner
            .notifications
            .get(user_id)?
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> NotificationStore {
        let store = NotificationStore::new();
        let mut u1 = User::new("u1", "Alice");
        u1.followers = vec!["u2".into(), "u3".into(), "u4".into()];
        store.put_user(u1).await;
        store.put_user(User::new("u2", "Bob")).await;
        store.put_user(User::new("u3", "Carol")).await;
        store.put_user(User::new("u4", "Dave")).await;
        store
    }

    #[tokio::test]
    async fn get_all_users_returns_every_seeded_user() {
        let store = seeded_store().await;
        let mut ids: Vec<_> = store.get_all_users().await.into_iter().map(|u| u.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["u1", "u2", "u3", "u4"]);
    }

    #[tokio::test]
    async fn get_followers_resolves_known_users() {
        let store = seeded_store().await;
        let followers = store.get_followers("u1").await.unwrap();
        let mut ids: Vec<_> = followers.iter().map(|u| u.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["u2", "u3", "u4"]);
    }

    #[tokio::test]
    async fn get_followers_drops_unresolved_ids_silently() {
        let store = seeded_store().await;
        let mut u1 = store.get_user("u1").await.unwrap();
        u1.followers.push("ghost".into());
        store.put_user(u1).await;

        let followers = store.get_followers("u1").await.unwrap();
        assert_eq!(followers.len(), 3);
    }

    #[tokio::test]
    async fn get_followers_unknown_user_is_not_found() {
        let store = NotificationStore::new();
        let err = store.get_followers("nobody").await.unwrap_err();
        assert_eq!(err, StoreError::UserNotFound("nobody".to_string()));
    }

    #[tokio::test]
    async fn get_user_notifications_unknown_user_is_empty_not_error() {
        let store = NotificationStore::new();
        let list = store.get_user_notifications("nobody", 20).await;
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn save_then_get_returns_newest_first() {
        let store = NotificationStore::new();
        store.put_user(User::new("u2", "Bob")).await;

        let first = Notification::new_queued("u2", "p1", "u1", "first");
        let second = Notification::new_queued("u2", "p2", "u1", "second");
        store.save_notification(first).await;
        store.save_notification(second.clone()).await;

        let list = store.get_user_notifications("u2", 20).await;
        assert_eq!(list[0].id, second.id);
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn update_notification_mutates_in_place() {
        let store = NotificationStore::new();
        store.put_user(User::new("u2", "Bob")).await;
        let mut n = Notification::new_queued("u2", "p1", "u1", "hi");
        store.save_notification(n.clone()).await;

        n.status = NotificationStatus::Delivered;
        n.attempts = 1;
        store.update_notification(n.clone()).await.unwrap();

        let list = store.get_user_notifications("u2", 20).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, NotificationStatus::Delivered);
        assert_eq!(list[0].attempts, 1);
    }

    #[tokio::test]
    async fn update_notification_unknown_id_is_not_found() {
        let store = NotificationStore::new();
        store.put_user(User::new("u2", "Bob")).await;
        store.save_notification(Notification::new_queued("u2", "p1", "u1", "hi")).await;

        let ghost = Notification::new_queued("u2", "p1", "u1", "hi");
        let err = store.update_notification(ghost.clone()).await.unwrap_err();
        assert_eq!(err, StoreError::NotificationNotFound(ghost.id, "u2".to_string()));
    }

    #[tokio::test]
    async fn update_notification_unknown_recipient_is_not_found() {
        let store = NotificationStore::new();
        let ghost = Notification::new_queued("nobody", "p1", "u1", "hi");
        let err = store.update_notification(ghost.clone()).await.unwrap_err();
        assert_eq!(err, StoreError::NotificationNotFound(ghost.id, "nobody".to_string()));
    }

    #[tokio::test]
    async fn get_user_notifications_respects_limit() {
        let store = NotificationStore::new();
        store.put_user(User::new("u2", "Bob")).await;
        for i in 0..5 {
            store
                .save_notification(Notification::new_queued("u2", format!("p{i}"), "u1", "hi"))
                .await;
        }
        let list = store.get_user_notifications("u2", 3).await;
        assert_eq!(list.len(), 3);
    }
}
