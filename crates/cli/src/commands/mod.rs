//! Subcommands and the adapter wiring they share

pub mod config;
pub mod doctor;
pub mod generate;
pub mod publish;
pub mod show;

use anyhow::{Context, Result, bail};
use dreampost_adapters::imaging::{
    ImageConfig as AdapterImageConfig, OpenAiImageGenerator, StubImageGenerator,
};
use dreampost_adapters::llm::{LlmConfig as AdapterLlmConfig, OpenAiIdeaGenerator, StubIdeaGenerator};
use dreampost_adapters::notify::SlackNotifier;
use dreampost_adapters::staging::FsStagingStore;
use dreampost_adapters::storage::{
    LocalDirStorage, S3Config as AdapterS3Config, S3Credentials, S3Storage,
};
use dreampost_domain::policy::CaptionPolicy;
use dreampost_domain::usecases::RenderConfig;
use dreampost_domain::{IdeaGenerator, ImageGenerator, ObjectStorage};
use secrecy::SecretString;
use std::sync::Arc;

use crate::config::AppConfig;

/// Read a value from the environment variable named by the config
pub(crate) fn load_env(env_var: &str, purpose: &str) -> Result<String> {
    if env_var.trim().is_empty() {
        bail!("No env var configured for {}", purpose);
    }

    let value = std::env::var(env_var)
        .with_context(|| format!("Missing env var {} for {}", env_var, purpose))?;

    if value.trim().is_empty() {
        bail!("Env var {} is empty for {}", env_var, purpose);
    }

    Ok(value.trim().to_string())
}

pub(crate) fn load_secret(env_var: &str, purpose: &str) -> Result<SecretString> {
    load_env(env_var, purpose).map(|v| SecretString::new(v.into()))
}

/// Like `load_env`, but an unset or empty variable is `None`
pub(crate) fn optional_env(env_var: &str) -> Option<String> {
    if env_var.trim().is_empty() {
        return None;
    }
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn optional_secret(env_var: &str) -> Option<SecretString> {
    optional_env(env_var).map(|v| SecretString::new(v.into()))
}

pub(crate) fn build_idea_generator(config: &AppConfig) -> Result<Arc<dyn IdeaGenerator>> {
    let llm_config = AdapterLlmConfig {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_output_tokens: config.llm.max_output_tokens,
        timeout_secs: config.llm.timeout_secs,
    };

    match config.llm.provider.as_str() {
        "openai" => {
            let api_key = load_secret(&config.llm.openai.api_key_env, "openai")?;
            Ok(Arc::new(OpenAiIdeaGenerator::with_base_url(
                api_key,
                config.llm.openai.base_url.clone(),
                llm_config,
            )))
        }
        "stub" => Ok(Arc::new(StubIdeaGenerator::default())),
        other => bail!("Unknown LLM provider: {}", other),
    }
}

pub(crate) fn build_image_generator(config: &AppConfig) -> Result<Arc<dyn ImageGenerator>> {
    let image_config = AdapterImageConfig {
        model: config.image.model.clone(),
        size: config.image.size.clone(),
        quality: config.image.quality.clone(),
        output_format: config.image.output_format,
        timeout_secs: config.image.timeout_secs,
    };

    match config.image.provider.as_str() {
        "openai" => {
            let api_key = load_secret(&config.llm.openai.api_key_env, "openai images")?;
            Ok(Arc::new(OpenAiImageGenerator::with_base_url(
                api_key,
                config.llm.openai.base_url.clone(),
                image_config,
            )))
        }
        "stub" => Ok(Arc::new(StubImageGenerator::default())),
        other => bail!("Unknown image provider: {}", other),
    }
}

/// Object storage, or `None` when images are kept for direct upload
pub(crate) fn build_storage(config: &AppConfig) -> Result<Option<Arc<dyn ObjectStorage>>> {
    let storage = &config.storage;

    match storage.provider.as_str() {
        "none" | "" => Ok(None),
        "s3" => {
            let s3 = &storage.s3;
            if s3.endpoint.trim().is_empty() || s3.bucket.trim().is_empty() {
                bail!("storage.s3 requires endpoint and bucket");
            }
            if s3.public_base_url.trim().is_empty() {
                bail!("storage.s3.public_base_url is required");
            }

            let credentials = S3Credentials {
                access_key_id: load_env(&s3.access_key_id_env, "s3 access key id")?,
                secret_access_key: load_secret(&s3.secret_access_key_env, "s3 secret key")?,
            };

            Ok(Some(Arc::new(S3Storage::new(
                AdapterS3Config {
                    endpoint: s3.endpoint.clone(),
                    bucket: s3.bucket.clone(),
                    region: s3.region.clone(),
                    public_base_url: s3.public_base_url.clone(),
                    key_prefix: s3.key_prefix.clone(),
                    timeout_secs: storage.timeout_secs,
                },
                credentials,
            ))))
        }
        "local_dir" => {
            let local = &storage.local_dir;
            if local.path.as_os_str().is_empty() || local.public_base_url.trim().is_empty() {
                bail!("storage.local_dir requires path and public_base_url");
            }
            Ok(Some(Arc::new(LocalDirStorage::new(
                local.path.clone(),
                local.public_base_url.clone(),
            ))))
        }
        other => bail!("Unknown storage provider: {}", other),
    }
}

pub(crate) fn build_staging(config: &AppConfig) -> Arc<FsStagingStore> {
    Arc::new(FsStagingStore::new(config.general.staging_path.clone()))
}

/// Slack notifier, disabled when suppressed or when no webhook is configured
pub(crate) fn build_notifier(config: &AppConfig, enabled: bool) -> Arc<SlackNotifier> {
    if !enabled {
        return Arc::new(SlackNotifier::disabled());
    }

    match optional_secret(&config.notify.slack_webhook_url_env) {
        Some(url) => Arc::new(SlackNotifier::new(url)),
        None => {
            tracing::warn!(
                env = %config.notify.slack_webhook_url_env,
                "Slack webhook not set; notifications disabled"
            );
            Arc::new(SlackNotifier::disabled())
        }
    }
}

pub(crate) fn render_config(config: &AppConfig) -> RenderConfig {
    RenderConfig {
        preview_base_url: config.notify.preview_base_url.clone(),
        ..RenderConfig::default()
    }
}

pub(crate) fn caption_policy(config: &AppConfig) -> CaptionPolicy {
    CaptionPolicy {
        title_max_chars: config.tiktok.title_max_chars,
        ..CaptionPolicy::default()
    }
}
