//! S3-compatible object storage (AWS S3, Cloudflare R2, MinIO)
//!
//! Objects are written with a single path-style `PutObject`. The bucket must
//! already be readable at `public_base_url`; no ACL is set.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use dreampost_domain::usecases::publish::content_type_for;
use dreampost_domain::{ObjectStorage, StorageError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::{file_name, public_url};

/// Bucket location and addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// API endpoint, e.g. `https://<account>.r2.cloudflarestorage.com`
    pub endpoint: String,
    pub bucket: String,
    /// Signing region; R2 uses `auto`
    pub region: String,
    /// Base URL under which uploaded keys are publicly readable
    pub public_base_url: String,
    /// Optional key prefix ("folder")
    pub key_prefix: String,
    pub timeout_secs: u64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            region: "auto".to_string(),
            public_base_url: String::new(),
            key_prefix: String::new(),
            timeout_secs: 60,
        }
    }
}

pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

pub struct S3Storage {
    client: Client,
    config: S3Config,
}

impl S3Storage {
    pub fn new(config: S3Config, credentials: S3Credentials) -> Self {
        let credentials = Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key.expose_secret(),
            None,
            None,
            "dreampost",
        );

        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint.trim_end_matches('/'))
            .force_path_style(true)
            // R2 rejects the default CRC32 checksum headers
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(config.timeout_secs))
                    .build(),
            )
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            config,
        }
    }

    fn object_key(&self, name: &str) -> String {
        let prefix = self.config.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, path: &Path) -> Result<String, StorageError> {
        let key = self.object_key(file_name(path)?);
        let body = tokio::fs::read(path).await?;
        let bytes = body.len();

        tracing::debug!(bucket = %self.config.bucket, %key, bytes, "Uploading object");

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(content_type_for(path))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(public_url(&self.config.public_base_url, &key))
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}

fn map_sdk_error(error: SdkError<PutObjectError, HttpResponse>) -> StorageError {
    let status = error.raw_response().map(|response| response.status().as_u16());
    let message = DisplayErrorContext(&error).to_string();

    match status {
        Some(401 | 403) => StorageError::Auth(message),
        _ => StorageError::Api(message),
    }
}
