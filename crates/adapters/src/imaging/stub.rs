//! Stub image generator for testing and offline mode

use async_trait::async_trait;
use dreampost_domain::{GenerationError, ImageGenerator, RenderedImage};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Returns a small solid-colour PNG, or a fixed hosted URL
pub struct StubImageGenerator {
    remote_url: Option<String>,
}

impl StubImageGenerator {
    /// Generator producing an inline PNG
    pub fn inline() -> Self {
        Self { remote_url: None }
    }

    /// Generator pointing at an already hosted image
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            remote_url: Some(url.into()),
        }
    }
}

impl Default for StubImageGenerator {
    fn default() -> Self {
        Self::inline()
    }
}

#[async_trait]
impl ImageGenerator for StubImageGenerator {
    async fn render(&self, _prompt: &str) -> Result<RenderedImage, GenerationError> {
        if let Some(url) = &self.remote_url {
            return Ok(RenderedImage::Remote { url: url.clone() });
        }

        // Deep night blue
        let img = RgbImage::from_pixel(16, 16, Rgb([18, 32, 86]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;

        Ok(RenderedImage::Inline {
            bytes: out.into_inner(),
            extension: "png".to_string(),
        })
    }
}
