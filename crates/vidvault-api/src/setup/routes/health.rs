//! Health check handler and response type.

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const STORAGE_CONNECTED: &str = "connected";
const STORAGE_NOT_CONFIGURED: &str = "not_configured";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// "connected" or "not_configured"
    pub azure_storage: String,
    /// e.g. "managed-identity", "not-configured"
    pub auth_method: String,
    pub timestamp: DateTime<Utc>,
}

/// Liveness plus static storage facts. No call is made to the storage backend, so this
/// answers 200 even when storage is unreachable.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let azure_storage = if state.storage.is_configured() {
        STORAGE_CONNECTED
    } else {
        STORAGE_NOT_CONFIGURED
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        azure_storage: azure_storage.to_string(),
        auth_method: state.storage.auth_method().as_str().to_string(),
        timestamp: Utc::now(),
    })
}
