//! Slack incoming-webhook notifier

use async_trait::async_trait;
use dreampost_domain::{Notification, NotificationBlock, NotifyError, Notifier};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

pub struct SlackNotifier {
    client: Client,
    webhook_url: SecretString,
    enabled: bool,
}

impl SlackNotifier {
    pub fn new(webhook_url: SecretString) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            webhook_url,
            enabled: true,
        }
    }

    /// Create a notifier that drops every message (no webhook configured)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            webhook_url: SecretString::new("".into()),
            enabled: false,
        }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    blocks: Vec<Block<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block<'a> {
    Section {
        text: TextObject<'a>,
    },
    Image {
        image_url: &'a str,
        alt_text: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<TextObject<'a>>,
    },
    Divider,
}

#[derive(Serialize)]
struct TextObject<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl<'a> From<&'a NotificationBlock> for Block<'a> {
    fn from(block: &'a NotificationBlock) -> Self {
        match block {
            NotificationBlock::Section(text) => Block::Section {
                text: TextObject {
                    kind: "mrkdwn",
                    text,
                },
            },
            NotificationBlock::Image {
                url,
                alt_text,
                title,
            } => Block::Image {
                image_url: url,
                alt_text,
                title: title.as_deref().map(|text| TextObject {
                    kind: "plain_text",
                    text,
                }),
            },
            NotificationBlock::Divider => Block::Divider,
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !self.enabled {
            tracing::debug!("Slack notifier disabled; dropping message");
            return Ok(());
        }

        let payload = WebhookPayload {
            text: &notification.text,
            blocks: notification.blocks.iter().map(Block::from).collect(),
        };

        let response = self
            .client
            .post(self.webhook_url.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api(format!("{}: {}", status, body)));
        }

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
