//! Google Cloud Vision text extraction client
//!
//! One call per inbound image: images:annotate with TEXT_DETECTION,
//! reading the full text annotation from the first response.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::TextExtractor;

const ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Vision client errors
#[derive(Debug, Error)]
pub enum VisionError {
    /// HTTP request failed
    #[error("Vision request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("Vision API error (HTTP {0}): {1}")]
    Api(u16, String),

    /// No text annotation in the response
    #[error("No text found in image")]
    NoText,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResult {
    #[serde(rename = "fullTextAnnotation")]
    full_text_annotation: Option<FullTextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiStatus {
    message: Option<String>,
}

pub struct VisionClient {
    http: reqwest::Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    async fn annotate(&self, image_url: &str) -> std::result::Result<String, VisionError> {
        let body = json!({
            "requests": [{
                "image": { "source": { "imageUri": image_url } },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .http
            .post(format!("{}?key={}", ANNOTATE_URL, self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(VisionError::Api(status.as_u16(), detail));
        }

        let parsed: AnnotateResponse = response.json().await?;
        let first = parsed.responses.into_iter().next().ok_or(VisionError::NoText)?;
        if let Some(error) = first.error {
            return Err(VisionError::Api(0, error.message.unwrap_or_default()));
        }
        match first.full_text_annotation {
            Some(annotation) if !annotation.text.trim().is_empty() => Ok(annotation.text),
            _ => Err(VisionError::NoText),
        }
    }
}

#[async_trait]
impl TextExtractor for VisionClient {
    async fn extract_text(&self, image_url: &str) -> Result<String> {
        Ok(self.annotate(image_url).await?)
    }
}
