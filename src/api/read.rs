//! Read API: per-user notification history and the metrics snapshot.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::MetricsSnapshot;
use crate::server::state::ReadState;
use crate::store::{Notification, User};

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub user_id: String,
    pub notifications: Vec<Notification>,
}

pub async fn get_notifications(
    State(state): State<ReadState>,
    Path(user_id): Path<String>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<NotificationsResponse>> {
    let limit = query.limit.unwrap_or(state.read_limit).min(state.read_limit);
    let notifications = state.store.get_user_notifications(&user_id, limit).await;

    Ok(Json(NotificationsResponse { user_id, notifications }))
}

pub async fn get_metrics(State(state): State<ReadState>) -> Json<MetricsSnapshot> {
    let snapshot = state.metrics.snapshot(state.queue.queue_len(), state.queue.worker_count()).await;
    Json(snapshot)
}

/// GET /v1/users - every seeded user, for operator/debug inspection of the
/// follower graph.
pub async fn get_users(State(state): State<ReadState>) -> Json<Vec<User>> {
    Json(state.store.get_all_users().await)
}
