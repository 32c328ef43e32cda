//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::model::{
    AccessToken, ContentIdea, Notification, PendingContent, PostDraft, RenderedImage,
    UploadTicket,
};

/// Error type for generative model calls (text and image)
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Port for the text model producing the daily idea
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    /// Produce a fresh scene description, caption and hashtags
    async fn generate_idea(&self) -> Result<ContentIdea, GenerationError>;
}

/// Port for the image model
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render an image for the given prompt
    async fn render(&self, prompt: &str) -> Result<RenderedImage, GenerationError>;
}

/// Error type for object storage uploads
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload failed: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Port for publishing a local file at a public URL
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload the file and return its public URL
    async fn upload(&self, path: &Path) -> Result<String, StorageError>;

    /// Backend name for logs (e.g., "s3")
    fn backend(&self) -> &'static str;
}

/// Error type for the staging store
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Staged record is corrupt: {0}")]
    Corrupt(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for the single-slot staging area
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Replace whatever is staged with `record`
    async fn put(&self, record: &PendingContent) -> Result<(), StagingError>;

    /// Current record, or `None` when nothing is staged
    async fn get(&self) -> Result<Option<PendingContent>, StagingError>;
}

/// Error type for notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Port for the human-facing status channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Whether messages actually leave the process
    fn is_enabled(&self) -> bool;
}

/// Error type for the publishing platform
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Request rejected ({code}): {message}")]
    Rejected { code: String, message: String },
}

/// Port for exchanging the long-lived refresh token for an access token
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    async fn refresh(&self) -> Result<AccessToken, PlatformError>;
}

/// Port for the social platform's content posting API
#[async_trait]
pub trait ContentPlatform: Send + Sync {
    /// Privacy levels the current account may post with
    async fn privacy_level_options(&self, token: &AccessToken)
    -> Result<Vec<String>, PlatformError>;

    /// Ask the platform to fetch the image from a public URL; returns the publish ID
    async fn publish_from_url(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
        image_url: &str,
    ) -> Result<String, PlatformError>;

    /// Start a direct-upload publish for a file of `size` bytes
    async fn init_file_upload(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
        size: u64,
    ) -> Result<UploadTicket, PlatformError>;

    /// Transfer the raw file bytes to the upload URL
    async fn upload_file(
        &self,
        ticket: &UploadTicket,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PlatformError>;

    /// Platform name (e.g., "tiktok")
    fn platform(&self) -> &'static str;
}
