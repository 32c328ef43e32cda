//! OAuth refresh-token exchange

use async_trait::async_trait;
use dreampost_domain::{AccessToken, CredentialRefresher, PlatformError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::TikTokConfig;
use crate::staging_fs::write_atomically;

/// Where the long-lived refresh token is read from and written back to
///
/// A configured file takes precedence over the static value so that a rotated
/// token survives between runs.
#[derive(Debug, Default)]
pub struct RefreshTokenStore {
    fallback: Option<SecretString>,
    file: Option<PathBuf>,
}

impl RefreshTokenStore {
    pub fn new(fallback: Option<SecretString>, file: Option<PathBuf>) -> Self {
        Self { fallback, file }
    }

    /// Token held only in memory (no write-back)
    pub fn fixed(token: SecretString) -> Self {
        Self::new(Some(token), None)
    }

    /// Current refresh token
    pub async fn current(&self) -> Result<SecretString, PlatformError> {
        if let Some(path) = &self.file {
            match tokio::fs::read_to_string(path).await {
                Ok(contents) if !contents.trim().is_empty() => {
                    return Ok(SecretString::new(contents.trim().into()));
                }
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "Refresh token file is empty");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(PlatformError::Auth(format!(
                        "failed to read {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        self.fallback
            .clone()
            .ok_or_else(|| PlatformError::Auth("no refresh token configured".to_string()))
    }

    /// Persist a rotated token, or warn that the stored one is now stale
    async fn rotate(&self, token: &str) {
        match &self.file {
            Some(path) => match write_atomically(path, token.as_bytes()).await {
                Ok(()) => tracing::info!(path = %path.display(), "Stored rotated refresh token"),
                Err(e) => tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to store rotated refresh token"
                ),
            },
            None => tracing::warn!(
                "TikTok issued a new refresh token but no refresh_token_file is configured; \
                 the configured token may stop working"
            ),
        }
    }
}

/// Exchanges the refresh token for a short-lived access token
///
/// Missing app credentials are reported by `refresh`, like a missing refresh
/// token, so the failure reaches the final notification.
pub struct TikTokCredentials {
    client: Client,
    config: TikTokConfig,
    client_key: Option<String>,
    client_secret: Option<SecretString>,
    refresh_token: RefreshTokenStore,
}

impl TikTokCredentials {
    pub fn new(
        config: TikTokConfig,
        client_key: Option<String>,
        client_secret: Option<SecretString>,
        refresh_token: RefreshTokenStore,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            client_key,
            client_secret,
            refresh_token,
        }
    }
}

/// Flat OAuth response; errors arrive in the same shape
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    open_id: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

#[async_trait]
impl CredentialRefresher for TikTokCredentials {
    async fn refresh(&self) -> Result<AccessToken, PlatformError> {
        let (Some(client_key), Some(client_secret)) = (&self.client_key, &self.client_secret)
        else {
            return Err(PlatformError::Auth(
                "client key and client secret must both be configured".to_string(),
            ));
        };
        let refresh_token = self.refresh_token.current().await?;

        let form = [
            ("client_key", client_key.as_str()),
            ("client_secret", client_secret.expose_secret()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
        ];

        let response = self
            .client
            .post(self.config.endpoint("/v2/oauth/token/"))
            .form(&form)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(PlatformError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Auth(format!("{}: {}", status, body)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error.filter(|e| !e.is_empty()) {
            return Err(PlatformError::Auth(format!(
                "{}: {}",
                error,
                body.error_description.unwrap_or_default()
            )));
        }

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                PlatformError::InvalidResponse("token response has no access_token".to_string())
            })?;

        if let Some(rotated) = body.refresh_token.filter(|t| !t.is_empty()) {
            if rotated != refresh_token.expose_secret() {
                self.refresh_token.rotate(&rotated).await;
            }
        }

        tracing::info!(expires_in = ?body.expires_in, "Access token refreshed");

        Ok(AccessToken {
            access_token: SecretString::new(access_token.into()),
            open_id: body.open_id,
            expires_in: body.expires_in,
        })
    }
}
