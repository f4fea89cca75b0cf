use thiserror::Error;

/// Errors surfaced by the notification store.
///
/// Never retried by the pipeline — a not-found condition means the caller asked
/// about something that was never recorded, not a transient failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("notification not found: {0} for user {1}")]
    NotificationNotFound(uuid::Uuid, String),
}
