use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use reqwest::{multipart, Body, Client};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;

use super::progress_tracker::ProgressSink;
use super::transport::{Transport, UploadFile, UploadResponse};

/// Body chunk size; progress is reported once per chunk handed to the client.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

const UPLOAD_PATH: &str = "/documents/upload";

/// Multipart HTTP client for the document service's upload endpoint
pub struct HttpTransport {
    client: Client,
    server_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(server_url: &str, api_key: Option<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            &config.server_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.server_url, UPLOAD_PATH)
    }

    fn build_form(
        &self,
        file: &UploadFile,
        progress: ProgressSink,
        groups: &[String],
    ) -> multipart::Form {
        let body = progress_body(file.content.clone(), progress);
        let part = multipart::Part::stream_with_length(body, file.size())
            .file_name(InputValidator::sanitize_filename(&file.name));

        let mut form = multipart::Form::new().part("file", part);
        for group in groups {
            form = form.text("groups", group.clone());
        }
        form
    }
}

/// Wrap the file content in a streaming body that reports progress as
/// each chunk is consumed.
fn progress_body(content: Bytes, progress: ProgressSink) -> Body {
    let total = content.len() as u64;
    let chunks: Vec<Bytes> = (0..content.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| content.slice(start..(start + UPLOAD_CHUNK_SIZE).min(content.len())))
        .collect();

    let mut sent: u64 = 0;
    let body = stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress.report_bytes(sent, total);
        Ok::<_, Infallible>(chunk)
    });

    Body::wrap_stream(body)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn upload(
        &self,
        file: &UploadFile,
        progress: ProgressSink,
        groups: &[String],
    ) -> AppResult<UploadResponse> {
        let url = self.upload_url();
        log::info!(
            "📤 Uploading {} ({:.2} MB) to {}",
            file.name,
            file.size() as f64 / 1024.0 / 1024.0,
            url
        );

        if file.content.is_empty() {
            progress.report(100);
        }

        let form = self.build_form(file, progress, groups);
        let mut request = self.client.post(&url).multipart(form);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-API-Key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let response_text = response.text().await?;
            log::debug!(
                "Upload response for {} (first 300 chars): {}",
                file.name,
                response_text.chars().take(300).collect::<String>()
            );
            return Ok(serde_json::from_str(&response_text)?);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(AppError::upload_failed(format!(
            "Server error {} for {}: {}",
            status, file.name, error_text
        )))
    }
}
