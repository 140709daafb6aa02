//! Image generation.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::{Client, ClientError};
use crate::http::HttpRequest;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape1792,
    #[serde(rename = "1024x1792")]
    Portrait1792,
    #[serde(rename = "1536x1024")]
    Landscape1536,
    #[serde(rename = "1024x1536")]
    Portrait1536,
    #[serde(rename = "auto")]
    Auto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Standard,
    Hd,
    Low,
    Medium,
    High,
    Auto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    Vivid,
    Natural,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    Url,
    B64Json,
}

/// Request body for `POST /images/generations`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub n: Option<u32>,
    pub size: Option<ImageSize>,
    pub quality: Option<ImageQuality>,
    pub style: Option<ImageStyle>,
    pub response_format: Option<ImageResponseFormat>,
    pub user: Option<String>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            n: None,
            size: None,
            quality: None,
            style: None,
            response_format: None,
            user: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_response_format(mut self, format: ImageResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub created: u64,
    pub data: Vec<Image>,
}

/// A generated image, returned either as a URL or inline as base64.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub url: Option<String>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<String>,
}

impl Image {
    /// Decode the inline image bytes.
    pub fn decode_b64(&self) -> Result<Vec<u8>, ClientError> {
        let encoded = self.b64_json.as_deref().ok_or_else(|| {
            ClientError::Config(
                "image has no inline data; request ImageResponseFormat::B64Json".to_string(),
            )
        })?;
        Ok(general_purpose::STANDARD.decode(encoded)?)
    }
}

impl Client {
    /// Generate images from a prompt.
    pub async fn create_image(&self, request: ImageRequest) -> Result<ImagesResponse, ClientError> {
        if request.prompt.trim().is_empty() {
            return Err(ClientError::Config("Image prompt must not be empty".to_string()));
        }
        self.send_json(HttpRequest::post_json("images/generations", &request)?)
            .await
    }
}
