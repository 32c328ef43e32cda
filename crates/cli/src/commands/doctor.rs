//! Doctor command - validate configuration and show status

use anyhow::Result;
use dreampost_domain::StagingStore;
use serde::Serialize;
use std::path::Path;

use super::build_staging;
use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    llm: CheckResult,
    image: CheckResult,
    storage: CheckResult,
    tiktok: CheckResult,
    notify: CheckResult,
    staging: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<&Path>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        image: CheckResult::error("Not checked"),
        storage: CheckResult::error("Not checked"),
        tiktok: CheckResult::error("Not checked"),
        notify: CheckResult::error("Not checked"),
        staging: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.llm = check_llm(config);
        report.image = check_image(config);
        report.storage = check_storage(config);
        report.tiktok = check_tiktok(config);
        report.notify = check_notify(config);
        report.staging = check_staging(config).await;
    }

    let checks = [
        &report.config,
        &report.llm,
        &report.image,
        &report.storage,
        &report.tiktok,
        &report.notify,
        &report.staging,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

/// Whether the named variable is set, without revealing its value
fn env_status(env_var: &str) -> &'static str {
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => "set",
        _ => "not set",
    }
}

fn check_env(label: &str, env_var: &str) -> CheckResult {
    if env_var.trim().is_empty() {
        return CheckResult::error(format!("No env var configured for {}", label));
    }

    match env_status(env_var) {
        "set" => CheckResult::ok(format!("{}: {} (set)", label, env_var)),
        _ => CheckResult::warn(format!("{}: {} (not set)", label, env_var)),
    }
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let provider = &config.llm.provider;
    let model = &config.llm.model;

    match provider.as_str() {
        "stub" => CheckResult::ok("Provider: stub (offline)"),
        "openai" => {
            let key = check_env("API key", &config.llm.openai.api_key_env);
            CheckResult {
                message: format!("Provider: openai, Model: {}, {}", model, key.message),
                ..key
            }
        }
        other => CheckResult::error(format!("Unknown provider: {}", other)),
    }
}

fn check_image(config: &AppConfig) -> CheckResult {
    let image = &config.image;

    match image.provider.as_str() {
        "stub" => CheckResult::ok("Provider: stub (offline)"),
        "openai" => {
            let key = check_env("API key", &config.llm.openai.api_key_env);
            CheckResult {
                message: format!(
                    "Provider: openai, Model: {}, Size: {}, {}",
                    image.model, image.size, key.message
                ),
                ..key
            }
        }
        other => CheckResult::error(format!("Unknown image provider: {}", other)),
    }
}

fn check_storage(config: &AppConfig) -> CheckResult {
    let storage = &config.storage;

    match storage.provider.as_str() {
        "none" | "" => CheckResult::ok("No object storage; posts use direct upload"),
        "s3" => {
            let s3 = &storage.s3;
            if s3.endpoint.trim().is_empty() || s3.bucket.trim().is_empty() {
                return CheckResult::error("storage.s3 requires endpoint and bucket");
            }
            if s3.public_base_url.trim().is_empty() {
                return CheckResult::error("storage.s3.public_base_url is required");
            }

            let key_id = env_status(&s3.access_key_id_env);
            let secret = env_status(&s3.secret_access_key_env);
            let message = format!(
                "Bucket: {}, Access key: {} ({}), Secret: {} ({})",
                s3.bucket, s3.access_key_id_env, key_id, s3.secret_access_key_env, secret
            );
            if key_id == "set" && secret == "set" {
                CheckResult::ok(message)
            } else {
                CheckResult::warn(message)
            }
        }
        "local_dir" => {
            let local = &storage.local_dir;
            if local.path.as_os_str().is_empty() || local.public_base_url.trim().is_empty() {
                return CheckResult::error("storage.local_dir requires path and public_base_url");
            }
            CheckResult::ok(format!(
                "Directory: {}, served at {}",
                local.path.display(),
                local.public_base_url
            ))
        }
        other => CheckResult::error(format!("Unknown storage provider: {}", other)),
    }
}

fn check_tiktok(config: &AppConfig) -> CheckResult {
    let tiktok = &config.tiktok;

    if tiktok.client_key_env.trim().is_empty() || tiktok.client_secret_env.trim().is_empty() {
        return CheckResult::error("No client key/secret env vars configured");
    }

    let client_key = env_status(&tiktok.client_key_env);
    let client_secret = env_status(&tiktok.client_secret_env);
    let refresh_token = match &tiktok.refresh_token_file {
        Some(path) if path.exists() => format!("file {}", path.display()),
        _ => format!("{} ({})", tiktok.refresh_token_env, env_status(&tiktok.refresh_token_env)),
    };
    let has_refresh_token = refresh_token.starts_with("file") || refresh_token.ends_with("(set)");

    let message = format!(
        "Client key: {} ({}), Client secret: {} ({}), Refresh token: {}",
        tiktok.client_key_env, client_key, tiktok.client_secret_env, client_secret, refresh_token
    );
    let details = serde_json::json!({
        "privacy_level": tiktok.privacy_level,
        "query_creator_info": tiktok.query_creator_info,
        "token_rotation_persisted": tiktok.refresh_token_file.is_some(),
    });

    if client_key == "set" && client_secret == "set" && has_refresh_token {
        CheckResult::ok(message).with_details(details)
    } else {
        CheckResult::warn(message).with_details(details)
    }
}

fn check_notify(config: &AppConfig) -> CheckResult {
    let env_var = &config.notify.slack_webhook_url_env;
    if env_var.trim().is_empty() {
        return CheckResult::warn("No Slack webhook env var configured; notifications disabled");
    }

    match env_status(env_var) {
        "set" => CheckResult::ok(format!("Slack webhook: {} (set)", env_var)),
        _ => CheckResult::warn(format!(
            "Slack webhook: {} (not set); notifications disabled",
            env_var
        )),
    }
}

async fn check_staging(config: &AppConfig) -> CheckResult {
    let staging = build_staging(config);
    let path = staging.path().display().to_string();

    match staging.get().await {
        Ok(Some(record)) => CheckResult::ok(format!("Post staged at {}", path)).with_details(
            serde_json::json!({
                "media_reference": record.media_reference.to_string(),
                "caption": record.caption,
            }),
        ),
        Ok(None) => CheckResult::ok(format!("Nothing staged at {}", path)),
        Err(e) => CheckResult::error(format!("Staging file {} is unusable: {}", path, e)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("dreampost Doctor Report");
    println!("=======================");
    println!();

    print_check("Config", &report.config);
    print_check("Idea Provider", &report.llm);
    print_check("Image Provider", &report.image);
    print_check("Storage", &report.storage);
    print_check("TikTok", &report.tiktok);
    print_check("Slack", &report.notify);
    print_check("Staging", &report.staging);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: dreampost generate --no-notify");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
