//! Ingest RPC: accepts a post and fans it out to its author's followers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::server::state::IngestState;

#[derive(Debug, Deserialize)]
pub struct PublishPostRequest {
    /// Optional client-supplied ID; minted if absent.
    pub id: Option<String>,
    pub author_id: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PublishPostResponse {
    pub post_id: String,
    pub notifications_queued: usize,
    pub success: bool,
}

pub async fn publish_post(State(state): State<IngestState>, Json(request): Json<PublishPostRequest>) -> Result<Json<PublishPostResponse>> {
    if request.author_id.trim().is_empty() {
        return Err(AppError::Validation("author_id must not be empty".to_string()));
    }

    let result = state.dispatch.publish_post(request.id, request.author_id, request.content).await?;

    Ok(Json(PublishPostResponse {
        post_id: result.post_id,
        notifications_queued: result.notifications_queued,
        success: result.success,
    }))
}
