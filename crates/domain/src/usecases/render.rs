//! Rendering use case - transforms pipeline state into human-readable notifications

use crate::model::{MediaReference, Notification, NotificationBlock, PendingContent, PublishReport};

/// Configuration for the renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Base URL under which local images are browsable (e.g. a repository raw URL)
    pub preview_base_url: Option<String>,
    /// Command a reviewer runs to approve
    pub publish_command: String,
    /// Command a reviewer runs to discard and regenerate
    pub regenerate_command: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preview_base_url: None,
            publish_command: "dreampost publish".to_string(),
            regenerate_command: "dreampost generate".to_string(),
        }
    }
}

/// Renderer for notification messages
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Message asking a human to approve or regenerate the staged record
    pub fn render_approval(&self, record: &PendingContent) -> Notification {
        let mut blocks = vec![NotificationBlock::Section(format!(
            "✨ *New Post Ready for Approval* ✨\n\n*Caption:*\n{}\n\n*Hashtags:*\n`{}`",
            record.caption, record.hashtags
        ))];

        blocks.push(self.image_block(&record.media_reference, "Daily dream illustration"));
        blocks.push(NotificationBlock::Divider);
        blocks.push(NotificationBlock::Section(format!(
            "To proceed, run one of:\n\n🔹 `{}` to post this content.\n🔹 `{}` to discard this version and create a new one.",
            self.config.publish_command, self.config.regenerate_command
        )));

        Notification {
            text: format!("New Post for Approval: {}", record.caption),
            blocks,
        }
    }

    /// Final status message after a publish attempt
    pub fn render_publish_result(
        &self,
        record: &PendingContent,
        report: &PublishReport,
    ) -> Notification {
        let status = if report.success {
            let mut status = "Successfully posted ✔️".to_string();
            if let Some(publish_id) = &report.publish_id {
                status.push_str(&format!(" (Publish ID: {})", publish_id));
            }
            status
        } else {
            let stage = report
                .failed_stage
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown stage".to_string());
            let error = report.error.as_deref().unwrap_or("unknown error");
            let mut status = format!("Failed to post ❌ ({} failed: {})", stage, error);
            if let Some(publish_id) = &report.publish_id {
                status.push_str(&format!(" (Publish ID: {})", publish_id));
            }
            status
        };

        let (text, heading) = if report.success {
            (
                format!("Post Published: {}", record.caption),
                "🚀 *Post Published!* 🚀",
            )
        } else {
            (
                format!("Post Failed: {}", record.caption),
                "⚠️ *Post Failed* ⚠️",
            )
        };

        Notification {
            text,
            blocks: vec![
                NotificationBlock::Section(format!(
                    "{}\n\n*Caption:*\n{}\n\n*Hashtags:*\n`{}`",
                    heading, record.caption, record.hashtags
                )),
                self.image_block(&record.media_reference, "Published dream illustration"),
                NotificationBlock::Section(format!("*Final Status:* {}", status)),
            ],
        }
    }

    /// Message sent when content generation aborts
    pub fn render_generation_failed(&self, error: &str) -> Notification {
        Notification {
            text: "Content generation failed".to_string(),
            blocks: vec![NotificationBlock::Section(format!(
                "❌ *Content generation failed*\n\n{}\n\nNothing new was staged. Run `{}` to try again.",
                error, self.config.regenerate_command
            ))],
        }
    }

    /// URL a reviewer can open to see the image, if one can be derived
    pub fn preview_url(&self, media: &MediaReference) -> Option<String> {
        match media {
            MediaReference::Url(url) => Some(url.clone()),
            MediaReference::LocalFile(path) => {
                let base = self.config.preview_base_url.as_deref()?;
                let file_name = path.file_name()?.to_string_lossy();
                Some(format!("{}/{}", base.trim_end_matches('/'), file_name))
            }
        }
    }

    fn image_block(&self, media: &MediaReference, alt_text: &str) -> NotificationBlock {
        match self.preview_url(media) {
            Some(url) => NotificationBlock::Image {
                url,
                alt_text: alt_text.to_string(),
                title: Some("Generated Image".to_string()),
            },
            None => NotificationBlock::Section(format!("*Image:* `{}`", media)),
        }
    }
}
