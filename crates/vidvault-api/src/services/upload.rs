//! Multipart batch upload.
//!
//! Files are read one field at a time. Each `files[]` field is validated, streamed into
//! storage and turned into a [`FileOutcome`]; a failure on one file never aborts the
//! others. Only request-level problems (storage not configured, nothing selected,
//! oversized body) return an error.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use chrono::Utc;
use futures::StreamExt;
use vidvault_core::models::{FileOutcome, UploadFailure, UploadedVideo};
use vidvault_core::validation::{content_type_for, is_allowed, sanitize};
use vidvault_core::AppError;
use vidvault_storage::keys::generate_key;
use vidvault_storage::{ByteStream, StorageError};

/// Multipart field carrying the files.
pub const FILES_FIELD: &str = "files[]";

const STORE_FAILED_MESSAGE: &str = "Failed to store file";

/// Whether the request body can still be read after a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyState {
    Intact,
    Broken,
}

pub struct UploadService<'a> {
    state: &'a AppState,
}

impl<'a> UploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Process every `files[]` field of the request in order.
    pub async fn upload_batch(
        &self,
        mut multipart: Multipart,
    ) -> Result<Vec<FileOutcome>, HttpAppError> {
        if !self.state.storage.is_configured() {
            return Err(AppError::StorageNotConfigured.into());
        }

        let mut seen_files_field = false;
        let mut outcomes = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| self.multipart_error(e))?
        {
            if field.name() != Some(FILES_FIELD) {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_string();

            if !seen_files_field {
                seen_files_field = true;
                if filename.is_empty() {
                    return Err(AppError::NoFilesSelected.into());
                }
            }

            if filename.is_empty() {
                continue;
            }

            let (outcome, body) = self.upload_file(field, &filename).await?;
            outcomes.push(outcome);
            if body == BodyState::Broken {
                tracing::warn!("Request body became unreadable; skipping remaining files");
                break;
            }
        }

        if !seen_files_field {
            return Err(AppError::NoFilesProvided.into());
        }

        Ok(outcomes)
    }

    async fn upload_file(
        &self,
        field: Field<'_>,
        filename: &str,
    ) -> Result<(FileOutcome, BodyState), HttpAppError> {
        if !is_allowed(filename) {
            tracing::debug!(filename = %filename, "Rejected file with disallowed extension");
            return Ok((
                FileOutcome::Rejected(UploadFailure::invalid_type(filename)),
                BodyState::Intact,
            ));
        }

        // Key and content type come from the validated name; sanitizing may rewrite it.
        let safe_filename = sanitize(filename);
        let blob_name = generate_key(filename);
        let content_type = content_type_for(filename);
        let container = self.state.container_name();

        if let Err(e) = self.state.storage.ensure_container(container).await {
            return Ok((self.failed(filename, &e), BodyState::Intact));
        }

        let limit_bytes = self.state.config.max_upload_size_bytes();
        let data: ByteStream<'_> = Box::pin(
            field.map(move |chunk| chunk.map_err(|e| stream_error(e, limit_bytes))),
        );

        let start = std::time::Instant::now();
        match self
            .state
            .storage
            .put_object(container, &blob_name, data, content_type)
            .await
        {
            Ok(output) => {
                tracing::info!(
                    filename = %safe_filename,
                    blob_name = %blob_name,
                    size_bytes = output.size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video uploaded"
                );
                Ok((
                    FileOutcome::Uploaded(UploadedVideo {
                        filename: safe_filename,
                        blob_name,
                        size: output.size,
                        url: output.url,
                        content_type: content_type.to_string(),
                        uploaded_at: Utc::now(),
                    }),
                    BodyState::Intact,
                ))
            }
            Err(e @ StorageError::PayloadTooLarge { .. }) => Err(e.into()),
            Err(e @ StorageError::BodyStream(_)) => Ok((self.failed(filename, &e), BodyState::Broken)),
            Err(e) => Ok((self.failed(filename, &e), BodyState::Intact)),
        }
    }

    fn failed(&self, filename: &str, error: &StorageError) -> FileOutcome {
        tracing::error!(error = %error, filename = %filename, "Error uploading file");
        let message = if self.state.config.is_production() {
            STORE_FAILED_MESSAGE.to_string()
        } else {
            error.to_string()
        };
        FileOutcome::Rejected(UploadFailure::upload_failed(filename, message))
    }

    fn multipart_error(&self, error: MultipartError) -> HttpAppError {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge {
                max_mb: self.state.max_upload_size_mb(),
            }
            .into()
        } else {
            AppError::InvalidInput(format!(
                "Failed to read multipart body: {}",
                error.body_text()
            ))
            .into()
        }
    }
}

fn stream_error(error: MultipartError, limit_bytes: usize) -> StorageError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StorageError::PayloadTooLarge { limit_bytes }
    } else {
        StorageError::BodyStream(error.body_text())
    }
}

/// Successes and failures of one batch, in request order.
pub fn partition_outcomes(outcomes: Vec<FileOutcome>) -> (Vec<UploadedVideo>, Vec<UploadFailure>) {
    let mut uploaded = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Uploaded(video) => uploaded.push(video),
            FileOutcome::Rejected(failure) => failed.push(failure),
        }
    }
    (uploaded, failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(name: &str) -> FileOutcome {
        FileOutcome::Uploaded(UploadedVideo {
            filename: name.to_string(),
            blob_name: format!("{}-key", name),
            size: 1,
            url: format!("http://localhost/memory/videos/{}-key", name),
            content_type: "video/mp4".to_string(),
            uploaded_at: Utc::now(),
        })
    }

    #[test]
    fn partition_keeps_request_order() {
        let outcomes = vec![
            uploaded("a.mp4"),
            FileOutcome::Rejected(UploadFailure::invalid_type("b.txt")),
            uploaded("c.mp4"),
            FileOutcome::Rejected(UploadFailure::upload_failed("d.mp4", "boom")),
        ];
        let (ok, failed) = partition_outcomes(outcomes);
        assert_eq!(
            ok.iter().map(|v| v.filename.as_str()).collect::<Vec<_>>(),
            ["a.mp4", "c.mp4"]
        );
        assert_eq!(
            failed.iter().map(|f| f.filename.as_str()).collect::<Vec<_>>(),
            ["b.txt", "d.mp4"]
        );
    }
}
