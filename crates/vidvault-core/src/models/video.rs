use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::allowed_extensions_label;

/// A file that was stored successfully during an upload batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UploadedVideo {
    /// Sanitized client filename
    pub filename: String,
    /// Generated storage key (`{uuid}.{extension}`)
    pub blob_name: String,
    /// Bytes written to storage
    pub size: u64,
    pub url: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A file from an upload batch that was not stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UploadFailure {
    /// Filename exactly as the client sent it
    pub filename: String,
    pub error: String,
    pub message: String,
}

impl UploadFailure {
    pub const INVALID_FILE_TYPE: &'static str = "Invalid file type";
    pub const UPLOAD_FAILED: &'static str = "Upload failed";

    pub fn invalid_type(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            error: Self::INVALID_FILE_TYPE.to_string(),
            message: format!("Only {} files are allowed", allowed_extensions_label()),
        }
    }

    pub fn upload_failed(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            error: Self::UPLOAD_FAILED.to_string(),
            message: message.into(),
        }
    }
}

/// Result of processing one file of an upload batch.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Uploaded(UploadedVideo),
    Rejected(UploadFailure),
}

/// An object enumerated from the video container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct VideoListItem {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub url: String,
    pub content_type: String,
    /// Last-modified time reported by the store, if any
    pub uploaded_at: Option<DateTime<Utc>>,
}
