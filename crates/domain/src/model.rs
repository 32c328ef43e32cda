//! Domain models and value objects

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the staged image lives
///
/// Persisted as a plain string: anything starting with `http://` or
/// `https://` is a URL the platform can pull, everything else is a local
/// path that must be uploaded directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MediaReference {
    /// Publicly resolvable URL
    Url(String),
    /// File on the local filesystem
    LocalFile(PathBuf),
}

impl MediaReference {
    pub fn is_url(&self) -> bool {
        matches!(self, MediaReference::Url(_))
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaReference::Url(_) => None,
            MediaReference::LocalFile(path) => Some(path),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            MediaReference::Url(url) => url.trim().is_empty(),
            MediaReference::LocalFile(path) => path.as_os_str().is_empty(),
        }
    }
}

impl From<String> for MediaReference {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
            MediaReference::Url(trimmed.to_string())
        } else {
            MediaReference::LocalFile(PathBuf::from(trimmed))
        }
    }
}

impl From<MediaReference> for String {
    fn from(value: MediaReference) -> Self {
        match value {
            MediaReference::Url(url) => url,
            MediaReference::LocalFile(path) => path.to_string_lossy().into_owned(),
        }
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaReference::Url(url) => f.write_str(url),
            MediaReference::LocalFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The single staged item awaiting human approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingContent {
    /// Image to publish
    pub media_reference: MediaReference,
    /// Caption text
    pub caption: String,
    /// Space-separated hashtags
    pub hashtags: String,
}

impl PendingContent {
    /// Build a record, rejecting empty fields
    pub fn new(
        media_reference: MediaReference,
        caption: impl Into<String>,
        hashtags: impl Into<String>,
    ) -> Result<Self, InvalidRecord> {
        let record = Self {
            media_reference,
            caption: caption.into(),
            hashtags: hashtags.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check that every field is present
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        if self.media_reference.is_empty() {
            return Err(InvalidRecord::MissingField("media_reference"));
        }
        if self.caption.trim().is_empty() {
            return Err(InvalidRecord::MissingField("caption"));
        }
        if self.hashtags.trim().is_empty() {
            return Err(InvalidRecord::MissingField("hashtags"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),
}

/// Scene description, caption and hashtags from the text model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub description: String,
    pub caption: String,
    pub hashtags: String,
}

impl ContentIdea {
    /// Trim all fields and reject the idea if any of them ends up empty
    pub fn validated(self) -> Result<Self, InvalidRecord> {
        let idea = Self {
            description: self.description.trim().to_string(),
            caption: self.caption.trim().to_string(),
            hashtags: self.hashtags.trim().to_string(),
        };
        if idea.description.is_empty() {
            return Err(InvalidRecord::MissingField("description"));
        }
        if idea.caption.is_empty() {
            return Err(InvalidRecord::MissingField("caption"));
        }
        if idea.hashtags.is_empty() {
            return Err(InvalidRecord::MissingField("hashtags"));
        }
        Ok(idea)
    }
}

/// Output of the image model
#[derive(Clone, PartialEq, Eq)]
pub enum RenderedImage {
    /// Decoded raster bytes with the file extension they are encoded as
    Inline { bytes: Vec<u8>, extension: String },
    /// Image hosted by the provider
    Remote { url: String },
}

impl fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedImage::Inline { bytes, extension } => f
                .debug_struct("Inline")
                .field("len", &bytes.len())
                .field("extension", extension)
                .finish(),
            RenderedImage::Remote { url } => f.debug_struct("Remote").field("url", url).finish(),
        }
    }
}

/// Short-lived platform credential
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: SecretString,
    pub open_id: Option<String>,
    /// Lifetime in seconds as reported by the platform
    pub expires_in: Option<u64>,
}

/// Post metadata sent with a publish request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub privacy_level: String,
    pub disable_comment: bool,
    pub auto_add_music: bool,
}

/// Result of initializing a direct-upload publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub publish_id: String,
    pub upload_url: String,
}

/// Stages of the publish pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    CredentialRefresh,
    CapabilityQuery,
    Submit,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStage::CredentialRefresh => "credential refresh",
            PublishStage::CapabilityQuery => "capability query",
            PublishStage::Submit => "submit",
        };
        f.write_str(name)
    }
}

/// Outcome of one publish invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub success: bool,
    pub publish_id: Option<String>,
    pub failed_stage: Option<PublishStage>,
    pub error: Option<String>,
}

impl PublishReport {
    pub fn succeeded(publish_id: String) -> Self {
        Self {
            success: true,
            publish_id: Some(publish_id),
            failed_stage: None,
            error: None,
        }
    }

    pub fn failed(stage: PublishStage, error: impl Into<String>) -> Self {
        Self {
            success: false,
            publish_id: None,
            failed_stage: Some(stage),
            error: Some(error.into()),
        }
    }

    /// Keep an identifier the platform issued before the failure
    pub fn with_publish_id(mut self, publish_id: impl Into<String>) -> Self {
        self.publish_id = Some(publish_id.into());
        self
    }
}

/// A human-readable status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Plain-text fallback / headline
    pub text: String,
    pub blocks: Vec<NotificationBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationBlock {
    /// Markdown section
    Section(String),
    Image {
        url: String,
        alt_text: String,
        title: Option<String>,
    },
    Divider,
}

impl Notification {
    /// Concatenated text of the headline and all sections
    pub fn plain_text(&self) -> String {
        let mut out = self.text.clone();
        for block in &self.blocks {
            match block {
                NotificationBlock::Section(text) => {
                    out.push('\n');
                    out.push_str(text);
                }
                NotificationBlock::Image { url, .. } => {
                    out.push('\n');
                    out.push_str(url);
                }
                NotificationBlock::Divider => {}
            }
        }
        out
    }
}
