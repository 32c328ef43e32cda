//! Publish command - submit the staged post to TikTok

use anyhow::{Result, bail};
use dreampost_adapters::notify::SlackNotifier;
use dreampost_adapters::staging::FsStagingStore;
use dreampost_adapters::tiktok::{
    RefreshTokenStore, TikTokConfig as AdapterTikTokConfig, TikTokCredentials, TikTokPlatform,
};
use dreampost_domain::usecases::{PublishConfig, PublishPipeline};
use std::sync::Arc;

use super::{
    build_notifier, build_staging, caption_policy, optional_env, optional_secret, render_config,
};
use crate::args::PublishArgs;
use crate::config::AppConfig;

type TikTokPipeline = PublishPipeline<FsStagingStore, TikTokCredentials, TikTokPlatform, SlackNotifier>;

pub async fn execute(args: PublishArgs, config: &AppConfig) -> Result<()> {
    let tiktok = &config.tiktok;
    let adapter_config = AdapterTikTokConfig {
        base_url: tiktok.base_url.clone(),
        timeout_secs: tiktok.timeout_secs,
    };

    // Missing app credentials or refresh token fail the refresh stage, which is reported
    let credentials = TikTokCredentials::new(
        adapter_config.clone(),
        optional_env(&tiktok.client_key_env),
        optional_secret(&tiktok.client_secret_env),
        RefreshTokenStore::new(
            optional_secret(&tiktok.refresh_token_env),
            tiktok.refresh_token_file.clone(),
        ),
    );

    let pipeline = PublishPipeline::new(
        build_staging(config),
        Arc::new(credentials),
        Arc::new(TikTokPlatform::new(adapter_config)),
        build_notifier(config, !args.dry_run),
        PublishConfig {
            privacy_level: tiktok.privacy_level.clone(),
            query_capabilities: tiktok.query_creator_info,
            disable_comment: tiktok.disable_comment,
            auto_add_music: tiktok.auto_add_music,
            caption_policy: caption_policy(config),
            render_config: render_config(config),
        },
    );

    if args.dry_run {
        return dry_run(&pipeline).await;
    }

    let report = pipeline.run().await?;

    if report.success {
        println!(
            "Post submitted (publish ID: {})",
            report.publish_id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    } else {
        if let Some(publish_id) = &report.publish_id {
            eprintln!("Publish ID issued before the failure: {}", publish_id);
        }
        bail!(
            "Publishing failed at {}: {}",
            report
                .failed_stage
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown stage".to_string()),
            report.error.as_deref().unwrap_or("unknown error")
        )
    }
}

/// Print the draft that would be submitted without touching the network
async fn dry_run(pipeline: &TikTokPipeline) -> Result<()> {
    let record = pipeline.load().await?;
    let draft = pipeline.draft(&record);
    let mode = if record.media_reference.is_url() {
        "pull from URL"
    } else {
        "direct upload"
    };

    tracing::info!(mode, privacy_level = %draft.privacy_level, "Dry run; nothing submitted");

    println!("[dry-run] Would publish {} via {}", record.media_reference, mode);
    println!("  Title:           {}", draft.title);
    println!(
        "  Description:     {}",
        draft.description.replace('\n', "\n                   ")
    );
    println!("  Privacy level:   {}", draft.privacy_level);
    println!("  Disable comment: {}", draft.disable_comment);
    println!("  Auto add music:  {}", draft.auto_add_music);

    Ok(())
}
