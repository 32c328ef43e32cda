//! Content Posting API: photo posts by URL pull or direct upload

use async_trait::async_trait;
use dreampost_domain::{AccessToken, ContentPlatform, PlatformError, PostDraft, UploadTicket};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{TikTokConfig, read_envelope};

pub struct TikTokPlatform {
    client: Client,
    config: TikTokConfig,
}

impl TikTokPlatform {
    pub fn new(config: TikTokConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    async fn init(
        &self,
        token: &AccessToken,
        request: &ContentInitRequest<'_>,
    ) -> Result<InitData, PlatformError> {
        let response = self
            .client
            .post(self.config.endpoint("/v2/post/publish/content/init/"))
            .bearer_auth(token.access_token.expose_secret())
            .header("Content-Type", "application/json; charset=UTF-8")
            .json(request)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let data: InitData = read_envelope(response).await?;
        if data.publish_id.is_empty() {
            return Err(PlatformError::InvalidResponse(
                "content init returned an empty publish_id".to_string(),
            ));
        }
        Ok(data)
    }
}

#[derive(Serialize)]
struct ContentInitRequest<'a> {
    post_info: &'a PostDraft,
    source_info: SourceInfo<'a>,
    post_mode: &'static str,
    media_type: &'static str,
}

impl<'a> ContentInitRequest<'a> {
    fn photo(draft: &'a PostDraft, source_info: SourceInfo<'a>) -> Self {
        Self {
            post_info: draft,
            source_info,
            post_mode: "DIRECT_POST",
            media_type: "PHOTO",
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "source", rename_all = "SCREAMING_SNAKE_CASE")]
enum SourceInfo<'a> {
    PullFromUrl {
        photo_cover_index: u32,
        photo_images: Vec<&'a str>,
    },
    FileUpload {
        photo_size: u64,
    },
}

#[derive(Deserialize)]
struct InitData {
    publish_id: String,
    upload_url: Option<String>,
}

#[derive(Deserialize)]
struct CreatorInfo {
    #[serde(default)]
    privacy_level_options: Vec<String>,
}

#[async_trait]
impl ContentPlatform for TikTokPlatform {
    async fn privacy_level_options(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<String>, PlatformError> {
        let response = self
            .client
            .post(self.config.endpoint("/v2/post/publish/creator_info/query/"))
            .bearer_auth(token.access_token.expose_secret())
            .header("Content-Type", "application/json; charset=UTF-8")
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let info: CreatorInfo = read_envelope(response).await?;
        Ok(info.privacy_level_options)
    }

    async fn publish_from_url(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
        image_url: &str,
    ) -> Result<String, PlatformError> {
        let request = ContentInitRequest::photo(
            draft,
            SourceInfo::PullFromUrl {
                photo_cover_index: 0,
                photo_images: vec![image_url],
            },
        );

        let data = self.init(token, &request).await?;

        tracing::info!(publish_id = %data.publish_id, "Pull-from-URL post accepted");
        Ok(data.publish_id)
    }

    async fn init_file_upload(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
        size: u64,
    ) -> Result<UploadTicket, PlatformError> {
        let request = ContentInitRequest::photo(draft, SourceInfo::FileUpload { photo_size: size });

        let data = self.init(token, &request).await?;
        let upload_url = data
            .upload_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                PlatformError::InvalidResponse("content init returned no upload_url".to_string())
            })?;

        tracing::debug!(publish_id = %data.publish_id, "Direct upload initialized");

        Ok(UploadTicket {
            publish_id: data.publish_id,
            upload_url,
        })
    }

    async fn upload_file(
        &self,
        ticket: &UploadTicket,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PlatformError> {
        if bytes.is_empty() {
            return Err(PlatformError::Api("refusing to upload an empty file".to_string()));
        }

        let len = bytes.len();
        let response = self
            .client
            .put(&ticket.upload_url)
            .header("Content-Type", content_type)
            .header("Content-Range", format!("bytes 0-{}/{}", len - 1, len))
            .body(bytes)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if status == 429 {
            return Err(PlatformError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api(format!(
                "upload returned {}: {}",
                status, body
            )));
        }

        tracing::info!(publish_id = %ticket.publish_id, bytes = len, "Image uploaded");
        Ok(())
    }

    fn platform(&self) -> &'static str {
        "tiktok"
    }
}
