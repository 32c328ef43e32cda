//! Configuration loading and management

use anyhow::{Context, Result};
use dreampost_adapters::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub tiktok: TikTokConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_staging_path")]
    pub staging_path: PathBuf,

    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_image_size")]
    pub size: String,

    #[serde(default = "default_image_quality")]
    pub quality: String,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,

    /// Prompt template; `{description}` is replaced with the scene
    #[serde(default)]
    pub style_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_provider")]
    pub provider: String,

    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub s3: S3Config,

    #[serde(default)]
    pub local_dir: LocalDirConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_s3_region")]
    pub region: String,

    #[serde(default = "default_s3_access_key_id_env")]
    pub access_key_id_env: String,

    #[serde(default = "default_s3_secret_access_key_env")]
    pub secret_access_key_env: String,

    #[serde(default)]
    pub public_base_url: String,

    #[serde(default)]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalDirConfig {
    #[serde(default)]
    pub path: PathBuf,

    #[serde(default)]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikTokConfig {
    #[serde(default = "default_tiktok_base_url")]
    pub base_url: String,

    #[serde(default = "default_tiktok_client_key_env")]
    pub client_key_env: String,

    #[serde(default = "default_tiktok_client_secret_env")]
    pub client_secret_env: String,

    #[serde(default = "default_tiktok_refresh_token_env")]
    pub refresh_token_env: String,

    /// Holds the current refresh token; rotated tokens are written back here
    #[serde(default)]
    pub refresh_token_file: Option<PathBuf>,

    #[serde(default = "default_privacy_level")]
    pub privacy_level: String,

    #[serde(default = "default_true")]
    pub query_creator_info: bool,

    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    #[serde(default)]
    pub disable_comment: bool,

    #[serde(default = "default_true")]
    pub auto_add_music: bool,

    #[serde(default = "default_tiktok_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_slack_webhook_url_env")]
    pub slack_webhook_url_env: String,

    /// Base URL under which locally kept images can be viewed
    #[serde(default)]
    pub preview_base_url: Option<String>,
}

// Default value functions
fn default_staging_path() -> PathBuf {
    PathBuf::from("./pending_post.json")
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("./images")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.8
}

fn default_timeout() -> u64 {
    60
}

fn default_max_output_tokens() -> u32 {
    400
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_image_model() -> String {
    "gpt-image-1".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_image_quality() -> String {
    "high".to_string()
}

fn default_image_timeout() -> u64 {
    180
}

fn default_storage_provider() -> String {
    "none".to_string()
}

fn default_storage_timeout() -> u64 {
    60
}

fn default_s3_region() -> String {
    "auto".to_string()
}

fn default_s3_access_key_id_env() -> String {
    "S3_ACCESS_KEY_ID".to_string()
}

fn default_s3_secret_access_key_env() -> String {
    "S3_SECRET_ACCESS_KEY".to_string()
}

fn default_tiktok_base_url() -> String {
    "https://open.tiktokapis.com".to_string()
}

fn default_tiktok_client_key_env() -> String {
    "TIKTOK_CLIENT_KEY".to_string()
}

fn default_tiktok_client_secret_env() -> String {
    "TIKTOK_CLIENT_SECRET".to_string()
}

fn default_tiktok_refresh_token_env() -> String {
    "TIKTOK_REFRESH_TOKEN".to_string()
}

fn default_privacy_level() -> String {
    "SELF_ONLY".to_string()
}

fn default_title_max_chars() -> usize {
    90
}

fn default_tiktok_timeout() -> u64 {
    30
}

fn default_slack_webhook_url_env() -> String {
    "SLACK_WEBHOOK_URL".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            staging_path: default_staging_path(),
            image_dir: default_image_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
            max_output_tokens: default_max_output_tokens(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_api_key_env(),
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_image_model(),
            size: default_image_size(),
            quality: default_image_quality(),
            output_format: OutputFormat::default(),
            timeout_secs: default_image_timeout(),
            style_template: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            timeout_secs: default_storage_timeout(),
            s3: S3Config::default(),
            local_dir: LocalDirConfig::default(),
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            region: default_s3_region(),
            access_key_id_env: default_s3_access_key_id_env(),
            secret_access_key_env: default_s3_secret_access_key_env(),
            public_base_url: String::new(),
            key_prefix: String::new(),
        }
    }
}

impl Default for TikTokConfig {
    fn default() -> Self {
        Self {
            base_url: default_tiktok_base_url(),
            client_key_env: default_tiktok_client_key_env(),
            client_secret_env: default_tiktok_client_secret_env(),
            refresh_token_env: default_tiktok_refresh_token_env(),
            refresh_token_file: None,
            privacy_level: default_privacy_level(),
            query_creator_info: default_true(),
            title_max_chars: default_title_max_chars(),
            disable_comment: false,
            auto_add_music: default_true(),
            timeout_secs: default_tiktok_timeout(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url_env: default_slack_webhook_url_env(),
            preview_base_url: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./dreampost.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("DREAMPOST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# dreampost configuration
#
# Secrets never live in this file: each *_env key names the environment
# variable holding the value.

[general]
staging_path = "./pending_post.json"
image_dir = "./images"
log_level = "info"

[llm]
provider = "openai"  # openai, stub
model = "gpt-4o-mini"
temperature = 0.8
timeout_secs = 60
max_output_tokens = 400

[llm.openai]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"

[image]
provider = "openai"  # openai (uses [llm.openai] credentials), stub
model = "gpt-image-1"
size = "1024x1024"
quality = "high"
output_format = "png"  # png, jpeg, keep
timeout_secs = 180
# style_template = "A whimsical digital illustration of: {description}."

[storage]
provider = "none"  # none (keep images locally and upload them directly), s3, local_dir
timeout_secs = 60

[storage.s3]
endpoint = "https://<account>.r2.cloudflarestorage.com"
bucket = "dreampost"
region = "auto"
access_key_id_env = "S3_ACCESS_KEY_ID"
secret_access_key_env = "S3_SECRET_ACCESS_KEY"
public_base_url = "https://media.example.com"
key_prefix = "daily"

[storage.local_dir]
path = "/var/www/media"
public_base_url = "https://media.example.com"

[tiktok]
base_url = "https://open.tiktokapis.com"
client_key_env = "TIKTOK_CLIENT_KEY"
client_secret_env = "TIKTOK_CLIENT_SECRET"
refresh_token_env = "TIKTOK_REFRESH_TOKEN"
# Rotated refresh tokens are written back here when set
# refresh_token_file = "./tiktok_refresh_token"
privacy_level = "SELF_ONLY"
query_creator_info = true
title_max_chars = 90
disable_comment = false
auto_add_music = true
timeout_secs = 30

[notify]
slack_webhook_url_env = "SLACK_WEBHOOK_URL"
# preview_base_url = "https://raw.githubusercontent.com/you/repo/main/images"
"#
        .to_string()
    }
}
