//! Content synthesis use case - idea, image, upload, stage, notify

use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    model::{MediaReference, Notification, PendingContent, RenderedImage},
    policy::CaptionPolicy,
    ports::{IdeaGenerator, ImageGenerator, Notifier, ObjectStorage, StagingStore},
    scratch::ScratchImage,
    usecases::render::{RenderConfig, Renderer},
};

/// Style directive wrapped around the scene description
pub const DEFAULT_STYLE_TEMPLATE: &str = "A whimsical digital illustration of: {description}. \
The style is minimalist, clean, flat vector art. \
Use a calming, monotone color palette, primarily in shades of deep blue and soft, glowing whites. \
The mood is cozy, serene, and dreamlike, perfect for a bedtime story. Centered composition.";

/// Configuration for the synthesizer
#[derive(Debug, Clone)]
pub struct SynthesizeConfig {
    /// Directory for rendered images before upload
    pub image_dir: PathBuf,
    /// Image prompt template; `{description}` is replaced with the scene
    pub style_template: String,
    /// Send the approval notification after staging
    pub notify: bool,
    pub caption_policy: CaptionPolicy,
    pub render_config: RenderConfig,
}

impl Default for SynthesizeConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("./images"),
            style_template: DEFAULT_STYLE_TEMPLATE.to_string(),
            notify: true,
            caption_policy: CaptionPolicy::default(),
            render_config: RenderConfig::default(),
        }
    }
}

/// Result of a successful synthesis run
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub record: PendingContent,
    /// Whether the approval notification was delivered
    pub notified: bool,
}

/// Errors from the synthesizer
#[derive(Debug, thiserror::Error)]
pub enum SynthesizeError {
    #[error("Text generation failed: {0}")]
    Idea(String),
    #[error("Image generation failed: {0}")]
    Image(String),
    #[error("Failed to write image file: {0}")]
    ImageFile(#[source] std::io::Error),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Staging error: {0}")]
    Staging(String),
    #[error("Nothing is staged")]
    NothingStaged,
}

/// Build the image prompt from the template and scene description
pub fn build_image_prompt(template: &str, description: &str) -> String {
    if template.contains("{description}") {
        template.replace("{description}", description)
    } else {
        format!("{} Scene: {}", template.trim_end(), description)
    }
}

/// Synthesizer orchestrator
pub struct Synthesizer<I, G, St, N>
where
    I: IdeaGenerator + ?Sized,
    G: ImageGenerator + ?Sized,
    St: StagingStore + ?Sized,
    N: Notifier + ?Sized,
{
    idea_generator: Arc<I>,
    image_generator: Arc<G>,
    storage: Option<Arc<dyn ObjectStorage>>,
    staging: Arc<St>,
    notifier: Arc<N>,
    config: SynthesizeConfig,
}

impl<I, G, St, N> Synthesizer<I, G, St, N>
where
    I: IdeaGenerator + ?Sized,
    G: ImageGenerator + ?Sized,
    St: StagingStore + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(
        idea_generator: Arc<I>,
        image_generator: Arc<G>,
        storage: Option<Arc<dyn ObjectStorage>>,
        staging: Arc<St>,
        notifier: Arc<N>,
        config: SynthesizeConfig,
    ) -> Self {
        Self {
            idea_generator,
            image_generator,
            storage,
            staging,
            notifier,
            config,
        }
    }

    /// Generate, stage, and announce a new record
    pub async fn run(&self) -> Result<SynthesisOutcome, SynthesizeError> {
        let renderer = Renderer::new(self.config.render_config.clone());

        match self.generate_and_stage().await {
            Ok(record) => {
                let notified = if self.config.notify {
                    self.send(&renderer.render_approval(&record)).await
                } else {
                    tracing::info!("Notification suppressed");
                    false
                };
                Ok(SynthesisOutcome { record, notified })
            }
            Err(error) => {
                tracing::error!(error = %error, "Content generation failed");
                if self.config.notify {
                    self.send(&renderer.render_generation_failed(&error.to_string()))
                        .await;
                }
                Err(error)
            }
        }
    }

    /// Re-send the approval notification for whatever is staged
    pub async fn notify_only(&self) -> Result<SynthesisOutcome, SynthesizeError> {
        announce_staged(
            self.staging.as_ref(),
            self.notifier.as_ref(),
            self.config.render_config.clone(),
        )
        .await
    }

    async fn generate_and_stage(&self) -> Result<PendingContent, SynthesizeError> {
        let policy = &self.config.caption_policy;

        tracing::info!("Generating scene, caption, and hashtags");
        let idea = self
            .idea_generator
            .generate_idea()
            .await
            .map_err(|e| SynthesizeError::Idea(e.to_string()))?
            .validated()
            .map_err(|e| SynthesizeError::Idea(e.to_string()))?;

        let hashtags = policy.normalize_hashtags(&idea.hashtags);
        if !policy.hashtag_count_ok(&hashtags) {
            tracing::warn!(
                hashtags = %hashtags,
                min = policy.min_hashtags,
                max = policy.max_hashtags,
                "Hashtag count outside expected range"
            );
        }

        tracing::info!(
            description = %idea.description,
            caption = %idea.caption,
            "Generated idea"
        );

        let prompt = build_image_prompt(&self.config.style_template, &idea.description);
        let image = self
            .image_generator
            .render(&prompt)
            .await
            .map_err(|e| SynthesizeError::Image(e.to_string()))?;

        let media = self.stage_media(image).await?;

        let record = PendingContent::new(media, idea.caption, hashtags)
            .map_err(|e| SynthesizeError::InvalidRecord(e.to_string()))?;

        self.staging
            .put(&record)
            .await
            .map_err(|e| SynthesizeError::Staging(e.to_string()))?;

        tracing::info!(media_reference = %record.media_reference, "Content staged for approval");

        Ok(record)
    }

    /// Turn the rendered image into something the platform can reach
    async fn stage_media(&self, image: RenderedImage) -> Result<MediaReference, SynthesizeError> {
        match image {
            RenderedImage::Remote { url } => {
                if url.trim().is_empty() {
                    return Err(SynthesizeError::Image("empty image URL".to_string()));
                }
                tracing::info!(url = %url, "Image hosted by provider");
                Ok(MediaReference::Url(url))
            }
            RenderedImage::Inline { bytes, extension } => {
                if bytes.is_empty() {
                    return Err(SynthesizeError::Image("empty image payload".to_string()));
                }

                let scratch = ScratchImage::write(&self.config.image_dir, &extension, &bytes)
                    .await
                    .map_err(SynthesizeError::ImageFile)?;

                let Some(storage) = &self.storage else {
                    let path = scratch.keep();
                    tracing::info!(path = %path.display(), "Keeping image for direct upload");
                    return Ok(MediaReference::LocalFile(path));
                };

                tracing::info!(
                    backend = storage.backend(),
                    path = %scratch.path().display(),
                    "Uploading image"
                );
                let uploaded = storage.upload(scratch.path()).await;
                drop(scratch);

                let url = uploaded.map_err(|e| SynthesizeError::Upload(e.to_string()))?;
                tracing::info!(url = %url, "Image uploaded");
                Ok(MediaReference::Url(url))
            }
        }
    }

    async fn send(&self, notification: &Notification) -> bool {
        deliver(self.notifier.as_ref(), notification).await
    }
}

/// Send the approval notification for the staged record without generating
pub async fn announce_staged<St, N>(
    staging: &St,
    notifier: &N,
    render_config: RenderConfig,
) -> Result<SynthesisOutcome, SynthesizeError>
where
    St: StagingStore + ?Sized,
    N: Notifier + ?Sized,
{
    let record = staging
        .get()
        .await
        .map_err(|e| SynthesizeError::Staging(e.to_string()))?
        .ok_or(SynthesizeError::NothingStaged)?;

    let renderer = Renderer::new(render_config);
    let notified = deliver(notifier, &renderer.render_approval(&record)).await;

    Ok(SynthesisOutcome { record, notified })
}

/// Best-effort delivery; failures are logged and reported as `false`
async fn deliver<N: Notifier + ?Sized>(notifier: &N, notification: &Notification) -> bool {
    if !notifier.is_enabled() {
        tracing::info!("Notifications disabled; skipping delivery");
        return false;
    }

    match notifier.notify(notification).await {
        Ok(()) => {
            tracing::info!("Notification sent");
            true
        }
        Err(error) => {
            tracing::warn!(error = %error, "Failed to send notification");
            false
        }
    }
}
