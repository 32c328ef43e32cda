//! Image model adapters and the raster codec they share

pub mod openai;
pub mod stub;

pub use openai::OpenAiImageGenerator;
pub use stub::StubImageGenerator;

use base64::Engine;
use dreampost_domain::GenerationError;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Encoding applied to inline images before they are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    /// Write the provider's bytes unchanged
    Keep,
}

/// Image model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub model: String,
    pub size: String,
    pub quality: String,
    pub output_format: OutputFormat,
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: "gpt-image-1".to_string(),
            size: "1024x1024".to_string(),
            quality: "high".to_string(),
            output_format: OutputFormat::Png,
            timeout_secs: 180,
        }
    }
}

/// Decode a base64 payload and re-encode it per `format`
///
/// Returns the bytes to write and the file extension that matches them.
pub fn decode_inline_image(
    b64: &str,
    format: OutputFormat,
) -> Result<(Vec<u8>, String), GenerationError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| GenerationError::InvalidFormat(format!("Invalid base64 image: {}", e)))?;

    if bytes.is_empty() {
        return Err(GenerationError::InvalidFormat(
            "Image payload is empty".to_string(),
        ));
    }

    normalize(bytes, format)
}

/// Re-encode raw image bytes
pub fn normalize(
    bytes: Vec<u8>,
    format: OutputFormat,
) -> Result<(Vec<u8>, String), GenerationError> {
    let target = match format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Keep => {
            let detected = image::guess_format(&bytes).map_err(|e| {
                GenerationError::InvalidFormat(format!("Unrecognized image data: {}", e))
            })?;
            return Ok((bytes, extension_for(detected).to_string()));
        }
    };

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| GenerationError::InvalidFormat(format!("Failed to decode image: {}", e)))?;

    // JPEG has no alpha channel
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut output = Cursor::new(Vec::new());
    rgb.write_to(&mut output, target)
        .map_err(|e| GenerationError::InvalidFormat(format!("Failed to encode image: {}", e)))?;

    Ok((output.into_inner(), extension_for(target).to_string()))
}

fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        other => other.extensions_str().first().copied().unwrap_or("bin"),
    }
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 40, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
