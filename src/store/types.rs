use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user and their follow relations.
///
/// Users are seeded once at process start; the store does not need to support
/// dynamic user creation for the delivery pipeline to be correct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Users who receive this user's posts.
    pub followers: Vec<String>,
    /// Users this user follows.
    pub following: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            followers: Vec::new(),
            following: Vec::new(),
        }
    }
}

/// An authored post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Delivery status of a notification.
///
/// Transition graph: Queued -> {Delivered, Retrying, Failed}; Retrying -> {Queued
/// (on re-enqueue), Delivered, Failed}. Delivered and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    Unknown,
    Queued,
    Delivered,
    Failed,
    Retrying,
}

impl NotificationStatus {
    /// Symbolic name used on the Read API wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Queued => "Queued",
            Self::Delivered => "Delivered",
            Self::Failed => "Failed",
            Self::Retrying => "Retrying",
        }
    }

    /// Inverse of [`NotificationStatus::as_str`]. Returns `Unknown` for anything
    /// not in the closed set, making the mapping a total function while still a
    /// bijection on the five defined symbols.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s {
            "Queued" => Self::Queued,
            "Delivered" => Self::Delivered,
            "Failed" => Self::Failed,
            "Retrying" => Self::Retrying,
            _ => Self::Unknown,
        }
    }
}

/// A recipient-addressed record of a post worth delivering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub status: NotificationStatus,
    pub attempts: u32,
}

impl Notification {
    pub fn new_queued(user_id: impl Into<String>, post_id: impl Into<String>, author_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            post_id: post_id.into(),
            author_id: author_id.into(),
            content: content.into(),
            created_at: Utc::now(),
            read: false,
            status: NotificationStatus::Queued,
            attempts: 0,
        }
    }
}
