//! TikTok Open API adapters
//!
//! - `auth`: refresh-token exchange and rotation
//! - `publish`: creator info, content init and direct upload

mod auth;
mod publish;

pub use auth::{RefreshTokenStore, TikTokCredentials};
pub use publish::TikTokPlatform;

use dreampost_domain::PlatformError;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "https://open.tiktokapis.com";

/// Connection settings shared by the TikTok adapters
#[derive(Debug, Clone)]
pub struct TikTokConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for TikTokConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl TikTokConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// `{ "data": ..., "error": { "code", "message", "log_id" } }`
///
/// `data` stays untyped until the error code is checked: rejections carry an
/// empty `data` object.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<serde_json::Value>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    log_id: String,
}

impl Envelope {
    /// Data of an accepted request; any code other than `ok` is a rejection
    fn into_data<T: DeserializeOwned>(self) -> Result<T, PlatformError> {
        match self.error {
            Some(error) if error.code != "ok" => {
                tracing::warn!(code = %error.code, log_id = %error.log_id, "TikTok rejected request");
                Err(PlatformError::Rejected {
                    code: error.code,
                    message: error.message,
                })
            }
            _ => {
                let data = self.data.ok_or_else(|| {
                    PlatformError::InvalidResponse("response has no data".to_string())
                })?;
                serde_json::from_value(data)
                    .map_err(|e| PlatformError::InvalidResponse(e.to_string()))
            }
        }
    }
}

/// Decode an enveloped JSON response, mapping transport-level statuses first
async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PlatformError> {
    let status = response.status();
    if status == 429 {
        return Err(PlatformError::RateLimited);
    }

    let body = response
        .text()
        .await
        .map_err(|e| PlatformError::Network(e.to_string()))?;

    match serde_json::from_str::<Envelope>(&body) {
        Ok(envelope) if status.is_success() => envelope.into_data(),
        Ok(Envelope {
            error: Some(error), ..
        }) if error.code != "ok" => {
            if status == 401 {
                Err(PlatformError::Auth(format!("{}: {}", error.code, error.message)))
            } else {
                Err(PlatformError::Rejected {
                    code: error.code,
                    message: error.message,
                })
            }
        }
        _ if status == 401 => Err(PlatformError::Auth(body)),
        _ if !status.is_success() => Err(PlatformError::Api(format!("{}: {}", status, body))),
        Err(e) => Err(PlatformError::InvalidResponse(e.to_string())),
        Ok(_) => Err(PlatformError::Api(format!("{}: {}", status, body))),
    }
}
