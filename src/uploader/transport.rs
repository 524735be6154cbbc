use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AppResult;

use super::progress_tracker::ProgressSink;

/// A picked file ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Success,
    PartialSuccess,
    Duplicated,
    Failure,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStatus::Success => "success",
            UploadStatus::PartialSuccess => "partial_success",
            UploadStatus::Duplicated => "duplicated",
            UploadStatus::Failure => "failure",
            UploadStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Application-level answer of the upload service for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: UploadStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub track_id: Option<String>,
}

impl UploadResponse {
    pub fn success() -> Self {
        Self {
            status: UploadStatus::Success,
            message: None,
            track_id: None,
        }
    }

    pub fn failure(status: UploadStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            track_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }

    /// Human readable reason for a non-success response.
    pub fn failure_reason(&self) -> String {
        match &self.message {
            Some(message) if !message.trim().is_empty() => message.clone(),
            _ => self.status.to_string(),
        }
    }
}

/// Moves one file to the upload service.
///
/// `Ok` carries the service's verdict, which may itself be a failure status.
/// `Err` signals a transport-level failure such as a network error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn upload(
        &self,
        file: &UploadFile,
        progress: ProgressSink,
        groups: &[String],
    ) -> AppResult<UploadResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses_service_json() {
        let response: UploadResponse = serde_json::from_str(
            r#"{"status":"duplicated","message":"File already exists","track_id":"upload_1"}"#,
        )
        .unwrap();

        assert_eq!(response.status, UploadStatus::Duplicated);
        assert!(!response.is_success());
        assert_eq!(response.failure_reason(), "File already exists");
        assert_eq!(response.track_id.as_deref(), Some("upload_1"));
    }

    #[test]
    fn test_unknown_status_is_not_success() {
        let response: UploadResponse = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(response.status, UploadStatus::Unknown);
        assert_eq!(response.failure_reason(), "unknown");
    }

    #[test]
    fn test_failure_reason_falls_back_to_status() {
        let response = UploadResponse {
            status: UploadStatus::Failure,
            message: Some("  ".to_string()),
            track_id: None,
        };
        assert_eq!(response.failure_reason(), "failure");
    }
}
