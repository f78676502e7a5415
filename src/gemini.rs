//! Client for the hosted multimodal model.
//!
//! Handlers only see [`ModelClient`], so tests can swap in a canned
//! implementation without any network access.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::upload::{resolve_mime_type, UploadedFile};

/// Longest slice of an error body kept for logs.
const ERROR_BODY_PREVIEW: usize = 500;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to reach model API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Failed to decode model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Model response contained no text")]
    EmptyResponse,
}

/// A binary part sent alongside the instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Standard base64 of the raw upload.
    pub data: String,
}

impl InlineImage {
    pub fn from_upload(file: &UploadedFile) -> Self {
        Self {
            mime_type: resolve_mime_type(file),
            data: general_purpose::STANDARD.encode(&file.bytes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<InlineImage>,
}

impl ModelRequest {
    fn payload(&self) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": self.prompt })];
        parts.extend(self.images.iter().map(|image| {
            serde_json::json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": image.data
                }
            })
        }));

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": parts
            }]
        })
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends the instruction and images, returning the model's analysis text.
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        info!(
            model = %request.model,
            images = request.images.len(),
            "Sending request to Gemini"
        );

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request.payload())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            warn!(%status, body = %preview, "Gemini returned an error");
            return Err(ModelError::Api { status, body: preview });
        }

        let text = extract_text(&serde_json::from_str(&body)?)?;
        debug!(chars = text.chars().count(), "Gemini analysis received");

        Ok(text)
    }
}

/// Joins every text part of the first candidate.
fn extract_text(response: &serde_json::Value) -> Result<String, ModelError> {
    let text: String = response["candidates"][0]["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    Ok(text)
}
