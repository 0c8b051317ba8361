use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{multipart, Client};
use serde_json::Value;

use crate::deepl::{DocumentApi, DocumentHandle, DocumentStatus, UsageStats};
use crate::errors::DeepLError;

/// Default endpoint for the DeepL free tier
pub const DEFAULT_ENDPOINT: &str = "https://api-free.deepl.com/v2";

/// DeepL HTTP client implementing the document-translation protocol
#[derive(Debug)]
pub struct DeepLClient {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
}

impl DeepLClient {
    /// Create a new DeepL client. An empty endpoint falls back to the
    /// public free-tier API.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: if endpoint.is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint.trim_end_matches('/').to_string()
            },
        }
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    /// Pull the most meaningful message out of a DeepL error body, which
    /// may carry either a top-level `message` or a nested `error.message`
    fn extract_error_message(body: &str, status: u16) -> String {
        if let Ok(json) = serde_json::from_str::<Value>(body) {
            if let Some(message) = json
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| {
                    json.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str())
                })
            {
                return message.to_string();
            }
        }
        format!("API Error ({})", status)
    }

    /// Map a non-success upload response to an error, distinguishing the
    /// service's size-limit rejection by its message text so callers can
    /// switch to the chunked path
    fn submission_error(status: u16, body: &str) -> DeepLError {
        let message = Self::extract_error_message(body, status);
        if message.contains("size limit") {
            DeepLError::SizeLimitExceeded { message }
        } else {
            DeepLError::SubmissionFailed { status, message }
        }
    }
}

#[async_trait]
impl DocumentApi for DeepLClient {
    async fn upload(
        &self,
        path: &Path,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<DocumentHandle, DeepLError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| DeepLError::RequestFailed(format!("Failed to read {:?}: {}", path, e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "subtitle.srt".to_string());

        let part = multipart::Part::bytes(content)
            .file_name(file_name)
            .mime_str("text/plain")
            .map_err(|e| DeepLError::RequestFailed(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("source_lang", source_lang.to_uppercase())
            .text("target_lang", target_lang.to_uppercase());

        let response = self
            .client
            .post(format!("{}/document", self.endpoint))
            .header("Authorization", self.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(|e| DeepLError::RequestFailed(format!("Document upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("DeepL upload rejected ({}): {}", status, body);
            return Err(Self::submission_error(status.as_u16(), &body));
        }

        let handle = response
            .json::<DocumentHandle>()
            .await
            .map_err(|e| DeepLError::ParseError(format!("Upload response: {}", e)))?;
        debug!("Uploaded document, job id {}", handle.document_id);

        Ok(handle)
    }

    async fn status(&self, handle: &DocumentHandle) -> Result<DocumentStatus, DeepLError> {
        let response = self
            .client
            .post(format!("{}/document/{}", self.endpoint, handle.document_id))
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "document_key": handle.document_key }))
            .send()
            .await
            .map_err(|e| DeepLError::RequestFailed(format!("Status poll failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "DeepL status poll for {} failed ({}): {}",
                handle.document_id, status, body
            );
            return Err(DeepLError::SubmissionFailed {
                status: status.as_u16(),
                message: Self::extract_error_message(&body, status.as_u16()),
            });
        }

        response
            .json::<DocumentStatus>()
            .await
            .map_err(|e| DeepLError::ParseError(format!("Status response: {}", e)))
    }

    async fn download(&self, handle: &DocumentHandle, output: &Path) -> Result<(), DeepLError> {
        let response = self
            .client
            .post(format!(
                "{}/document/{}/result",
                self.endpoint, handle.document_id
            ))
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "document_key": handle.document_key }))
            .send()
            .await
            .map_err(|e| DeepLError::RequestFailed(format!("Result download failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "DeepL result download for {} failed ({}): {}",
                handle.document_id, status, body
            );
            return Err(DeepLError::SubmissionFailed {
                status: status.as_u16(),
                message: Self::extract_error_message(&body, status.as_u16()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeepLError::RequestFailed(format!("Result body read failed: {}", e)))?;

        tokio::fs::write(output, &bytes).await.map_err(|e| {
            DeepLError::RequestFailed(format!("Failed to write {:?}: {}", output, e))
        })?;
        debug!(
            "Downloaded translated document {} to {:?} ({} bytes)",
            handle.document_id,
            output,
            bytes.len()
        );

        Ok(())
    }

    async fn usage(&self) -> Result<UsageStats, DeepLError> {
        let response = self
            .client
            .get(format!("{}/usage", self.endpoint))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| DeepLError::RequestFailed(format!("Usage request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeepLError::SubmissionFailed {
                status: status.as_u16(),
                message: Self::extract_error_message(&body, status.as_u16()),
            });
        }

        response
            .json::<UsageStats>()
            .await
            .map_err(|e| DeepLError::ParseError(format!("Usage response: {}", e)))
    }
}
