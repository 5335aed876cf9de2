use crate::config::Ocr;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("OCR API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("OCR API key not set: environment variable {0} is empty or missing")]
    MissingApiKey(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub markdown: String,
}

impl OcrResponse {
    /// Convenience for a one-page answer.
    pub fn from_markdown(markdown: impl Into<String>) -> Self {
        Self {
            pages: vec![OcrPage {
                index: Some(0),
                markdown: markdown.into(),
            }],
        }
    }
}

/// Remote OCR for one JPEG page image. Implementations must be cheap to
/// share: one instance serves every page of every document.
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn ocr(&self, jpeg: &[u8]) -> Result<OcrResponse, OcrError>;
}

/// Client for Mistral's `/v1/ocr` endpoint.
pub struct MistralOcrClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl MistralOcrClient {
    pub fn new(api_base: String, api_key: String, model: String, timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    /// Reads the key from the environment variable named in the config.
    pub fn from_config(cfg: &Ocr) -> Result<Self, OcrError> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| OcrError::MissingApiKey(cfg.api_key_env.clone()))?;
        Self::new(
            cfg.api_base.clone(),
            api_key,
            cfg.model.clone(),
            cfg.api_timeout(),
        )
    }
}

#[async_trait]
impl OcrClient for MistralOcrClient {
    async fn ocr(&self, jpeg: &[u8]) -> Result<OcrResponse, OcrError> {
        let url = format!("{}/v1/ocr", self.api_base);
        let body = json!({
            "model": self.model,
            "document": {
                "type": "image_url",
                "image_url": format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)),
            },
            "include_image_base64": false,
        });

        debug!("OCR request to {} ({} image bytes)", url, jpeg.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<OcrResponse>().await?)
    }
}
