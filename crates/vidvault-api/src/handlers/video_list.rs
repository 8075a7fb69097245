use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use vidvault_core::models::VideoListItem;
use vidvault_storage::StoredObject;

const EMPTY_CONTAINER_MESSAGE: &str = "No videos uploaded yet";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoListResponse {
    pub success: bool,
    pub videos: Vec<VideoListItem>,
    pub total: usize,
    /// Set only when the container has not been created yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn to_list_item(object: StoredObject) -> VideoListItem {
    VideoListItem {
        id: object.key.clone(),
        filename: object.key,
        size: object.size,
        url: object.url,
        content_type: object.content_type,
        uploaded_at: object.last_modified,
    }
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Every object in the video container", body = VideoListResponse),
        (status = 500, description = "Storage not configured or listing failed", body = ErrorResponse)
    )
)]
pub async fn list_videos(State(state): State<Arc<AppState>>) -> Response {
    match list(&state).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response_with(state.config.is_production()),
    }
}

async fn list(state: &AppState) -> Result<VideoListResponse, HttpAppError> {
    let Some(objects) = state.storage.list_existing(state.container_name()).await? else {
        tracing::debug!(container = %state.container_name(), "Container does not exist yet");
        return Ok(VideoListResponse {
            success: true,
            videos: Vec::new(),
            total: 0,
            message: Some(EMPTY_CONTAINER_MESSAGE.to_string()),
        });
    };

    let videos: Vec<VideoListItem> = objects.into_iter().map(to_list_item).collect();
    Ok(VideoListResponse {
        success: true,
        total: videos.len(),
        videos,
        message: None,
    })
}
