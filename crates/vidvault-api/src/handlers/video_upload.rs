use crate::error::ErrorResponse;
use crate::services::upload::{partition_outcomes, UploadService};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use vidvault_core::models::{FileOutcome, UploadFailure, UploadedVideo};

/// Batch upload result.
///
/// `errors` and `error_count` are only present when at least one file failed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// True when at least one file was stored
    pub success: bool,
    pub files: Vec<UploadedVideo>,
    /// Number of stored files
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<UploadFailure>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<usize>,
}

impl UploadResponse {
    pub fn from_outcomes(outcomes: Vec<FileOutcome>) -> Self {
        let (files, errors) = partition_outcomes(outcomes);
        let error_count = (!errors.is_empty()).then_some(errors.len());
        Self {
            success: !files.is_empty(),
            total: files.len(),
            files,
            errors: (!errors.is_empty()).then_some(errors),
            error_count,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "One or more files under the `files[]` field"),
    responses(
        (status = 200, description = "At least one file stored", body = UploadResponse),
        (status = 400, description = "No files provided, or every file was rejected", body = UploadResponse),
        (status = 413, description = "Request body exceeds the upload limit", body = ErrorResponse),
        (status = 500, description = "Storage not configured or unexpected failure", body = ErrorResponse)
    )
)]
pub async fn upload_videos(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let outcomes = match UploadService::new(&state).upload_batch(multipart).await {
        Ok(outcomes) => outcomes,
        Err(e) => return e.into_response_with(state.config.is_production()),
    };
    let response = UploadResponse::from_outcomes(outcomes);

    tracing::info!(
        uploaded = response.total,
        failed = response.error_count.unwrap_or(0),
        "Upload batch processed"
    );

    (response.status_code(), Json(response)).into_response()
}
