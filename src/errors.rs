use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported file type: {path}")]
    UnsupportedFileType { path: String },

    #[error("File too large: {path}. Maximum size is {limit_mb}MB.")]
    FileTooLarge { path: String, limit_mb: u64 },

    #[error("Upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Upload dialog is closed")]
    DialogClosed,
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn file_not_found(path: &str) -> Self {
        Self::FileNotFound {
            path: path.to_string(),
        }
    }

    pub fn unsupported_file_type(path: &str) -> Self {
        Self::UnsupportedFileType {
            path: path.to_string(),
        }
    }

    pub fn file_too_large(path: &str, limit_mb: u64) -> Self {
        Self::FileTooLarge {
            path: path.to_string(),
            limit_mb,
        }
    }

    pub fn upload_failed(reason: impl Into<String>) -> Self {
        Self::UploadFailed {
            reason: reason.into(),
        }
    }

    /// Message shown to the user, without the variant prefix where the
    /// variant only wraps a reason.
    pub fn user_message(&self) -> String {
        match self {
            AppError::UploadFailed { reason } => reason.clone(),
            AppError::Config(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Errors raised by the transport layer rather than by input checks.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::UploadFailed { .. } | AppError::Io(_)
        )
    }

    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            AppError::FileNotFound { .. }
                | AppError::UnsupportedFileType { .. }
                | AppError::FileTooLarge { .. }
                | AppError::Validation { .. }
        )
    }
}
