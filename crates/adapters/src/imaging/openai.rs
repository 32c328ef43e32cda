//! OpenAI Images adapter

use async_trait::async_trait;
use dreampost_domain::{GenerationError, ImageGenerator, RenderedImage};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ImageConfig, decode_inline_image};

/// Image generator backed by the OpenAI images endpoint
pub struct OpenAiImageGenerator {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: ImageConfig,
}

impl OpenAiImageGenerator {
    pub fn new(api_key: SecretString, config: ImageConfig) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com/v1".to_string(), config)
    }

    pub fn with_base_url(api_key: SecretString, base_url: String, config: ImageConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            config,
        }
    }
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
    url: Option<String>,
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn render(&self, prompt: &str) -> Result<RenderedImage, GenerationError> {
        let request = ImageRequest {
            model: &self.config.model,
            prompt,
            n: 1,
            size: &self.config.size,
            quality: &self.config.quality,
        };

        let url = format!(
            "{}/images/generations",
            self.base_url.trim_end_matches('/')
        );

        tracing::debug!(model = %self.config.model, size = %self.config.size, "Requesting image");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Api(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(GenerationError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;

        let first = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::InvalidFormat("No image in response".to_string()))?;

        if let Some(b64) = first.b64_json.filter(|s| !s.trim().is_empty()) {
            let (bytes, extension) = decode_inline_image(&b64, self.config.output_format)?;
            tracing::info!(bytes = bytes.len(), %extension, "Image generated");
            return Ok(RenderedImage::Inline { bytes, extension });
        }

        if let Some(url) = first.url.filter(|s| !s.trim().is_empty()) {
            tracing::info!(%url, "Image generated (hosted)");
            return Ok(RenderedImage::Remote { url });
        }

        Err(GenerationError::InvalidFormat(
            "Image response has neither b64_json nor url".to_string(),
        ))
    }
}
