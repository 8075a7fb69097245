//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors and `?` so they become
//! `HttpAppError` and render consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vidvault_core::{AppError, ErrorMetadata, LogLevel};
use vidvault_storage::StorageError;

/// Message shown in place of sensitive details in production.
const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// Request-level error body: `{success: false, error, message}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Short error label, e.g. "No files provided"
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from vidvault-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::Unavailable => AppError::StorageNotConfigured,
            StorageError::PayloadTooLarge { limit_bytes } => AppError::PayloadTooLarge {
                max_mb: limit_bytes / 1024 / 1024,
            },
            StorageError::BodyStream(msg) => AppError::InvalidInput(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                details = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

impl HttpAppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Response body; sensitive details are replaced when `hide_details` is set.
    pub fn body(&self, hide_details: bool) -> ErrorResponse {
        let app_error = &self.0;
        let message = if hide_details && app_error.is_sensitive() {
            GENERIC_MESSAGE.to_string()
        } else {
            app_error.client_message()
        };
        ErrorResponse::new(app_error.error_label(), message)
    }

    /// Log and render. Handlers pass `config.is_production()`.
    pub fn into_response_with(self, hide_details: bool) -> Response {
        log_error(&self.0);
        let body = self.body(hide_details);
        (self.status(), Json(body)).into_response()
    }
}

/// Paths without access to the config (fallback, middleware) hide sensitive details.
impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        self.into_response_with(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_storage_maps_to_not_configured() {
        let err = HttpAppError::from(StorageError::Unavailable);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body(false);
        assert!(!body.success);
        assert_eq!(body.error, "Azure Storage not configured");
    }

    #[test]
    fn payload_too_large_reports_megabytes() {
        let err = HttpAppError::from(StorageError::PayloadTooLarge {
            limit_bytes: 100 * 1024 * 1024,
        });
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = err.body(true);
        assert_eq!(body.error, "File too large");
        assert_eq!(body.message, "Maximum file size is 100MB");
    }

    #[test]
    fn backend_failures_are_hidden_in_production() {
        let err = HttpAppError::from(StorageError::ListFailed("tcp reset by 10.0.0.4".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let hidden = err.body(true);
        assert_eq!(hidden.error, "Server error");
        assert_eq!(hidden.message, GENERIC_MESSAGE);

        let shown = err.body(false);
        assert!(shown.message.contains("10.0.0.4"));
    }

    #[test]
    fn no_files_messages_are_never_hidden() {
        let err = HttpAppError::from(AppError::NoFilesProvided);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body(true);
        assert_eq!(body.error, "No files provided");
        assert_eq!(body.message, "Please select files to upload");
    }

    #[test]
    fn error_response_serializes_success_false() {
        let json = serde_json::to_value(ErrorResponse::new("Not found", "missing")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Not found");
        assert_eq!(json["message"], "missing");
    }
}
