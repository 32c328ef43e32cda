//! Generate command - create a new post and stage it for approval

use anyhow::{Context, Result};
use dreampost_domain::usecases::synthesize::DEFAULT_STYLE_TEMPLATE;
use dreampost_domain::usecases::{SynthesizeConfig, Synthesizer, announce_staged};

use super::{
    build_idea_generator, build_image_generator, build_notifier, build_staging, build_storage,
    caption_policy, render_config,
};
use crate::args::GenerateArgs;
use crate::config::AppConfig;

pub async fn execute(args: GenerateArgs, config: &AppConfig) -> Result<()> {
    let staging = build_staging(config);
    let notifier = build_notifier(config, !args.no_notify);

    if args.notify_only {
        let outcome = announce_staged(staging.as_ref(), notifier.as_ref(), render_config(config))
            .await
            .context("Failed to re-send approval request")?;

        println!(
            "Approval request {} for: {}",
            if outcome.notified { "sent" } else { "not sent" },
            outcome.record.caption
        );
        return Ok(());
    }

    let synthesizer = Synthesizer::new(
        build_idea_generator(config)?,
        build_image_generator(config)?,
        build_storage(config)?,
        staging.clone(),
        notifier,
        SynthesizeConfig {
            image_dir: config.general.image_dir.clone(),
            style_template: config
                .image
                .style_template
                .clone()
                .unwrap_or_else(|| DEFAULT_STYLE_TEMPLATE.to_string()),
            notify: !args.no_notify,
            caption_policy: caption_policy(config),
            render_config: render_config(config),
        },
    );

    let outcome = synthesizer
        .run()
        .await
        .context("Content generation failed")?;

    println!("Staged post in {}", staging.path().display());
    println!("  Image:    {}", outcome.record.media_reference);
    println!("  Caption:  {}", outcome.record.caption);
    println!("  Hashtags: {}", outcome.record.hashtags);
    if outcome.notified {
        println!("Approval request sent.");
    }

    Ok(())
}
