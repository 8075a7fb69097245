//! Error types module
//!
//! All request-level failures are unified under `AppError`. Per-file upload failures are
//! not errors at this level: they are reported inside a successful batch response.

/// Level an error is logged at when it reaches the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Client mistakes
    Debug,
    /// Deployment problems, e.g. storage not configured
    Warn,
    Error,
}

/// How an error is rendered as `{success: false, error, message}`.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Value of the `error` field
    fn error_label(&self) -> &'static str;

    /// Value of the `message` field
    fn client_message(&self) -> String;

    /// Message is replaced by a generic one in production
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage backend is not configured")]
    StorageNotConfigured,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No files provided")]
    NoFilesProvided,

    #[error("No files selected")]
    NoFilesSelected,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request body exceeds the maximum of {max_mb}MB")]
    PayloadTooLarge { max_mb: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_label, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::StorageNotConfigured => (500, "Azure Storage not configured", false, LogLevel::Warn),
        AppError::Storage(_) => (500, "Server error", true, LogLevel::Error),
        AppError::NoFilesProvided => (400, "No files provided", false, LogLevel::Debug),
        AppError::NoFilesSelected => (400, "No files provided", false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "Bad request", false, LogLevel::Debug),
        AppError::PayloadTooLarge { .. } => (413, "File too large", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "Not found", false, LogLevel::Debug),
        AppError::Internal(_) => (500, "Internal server error", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "Internal server error", true, LogLevel::Error),
    }
}

impl AppError {
    /// Variant name recorded as `error_type` in logs.
    pub fn error_type(&self) -> &str {
        match self {
            AppError::StorageNotConfigured => "StorageNotConfigured",
            AppError::Storage(_) => "Storage",
            AppError::NoFilesProvided => "NoFilesProvided",
            AppError::NoFilesSelected => "NoFilesSelected",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Message followed by its `source()` chain, for error logs.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = match self {
            AppError::InternalWithSource { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_label(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::StorageNotConfigured => {
                "Please configure the AZURE_STORAGE_ACCOUNT_NAME environment variable".to_string()
            }
            AppError::Storage(ref msg) => msg.clone(),
            AppError::NoFilesProvided => "Please select files to upload".to_string(),
            AppError::NoFilesSelected => "Please select at least one file to upload".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge { max_mb } => format!("Maximum file size is {}MB", max_mb),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(ref msg) => msg.clone(),
            AppError::InternalWithSource { ref message, .. } => message.clone(),
        }
    }
}
