//! Show command - print the staged post

use anyhow::{Context, Result};
use dreampost_domain::StagingStore;

use super::build_staging;
use crate::args::ShowArgs;
use crate::config::AppConfig;

pub async fn execute(args: ShowArgs, config: &AppConfig) -> Result<()> {
    let staging = build_staging(config);
    let record = staging
        .get()
        .await
        .with_context(|| format!("Failed to read {}", staging.path().display()))?;

    match (record, args.json) {
        (Some(record), true) => println!("{}", serde_json::to_string_pretty(&record)?),
        (None, true) => println!("null"),
        (Some(record), false) => {
            println!("Staged post ({})", staging.path().display());
            println!("  Image:    {}", record.media_reference);
            println!("  Caption:  {}", record.caption);
            println!("  Hashtags: {}", record.hashtags);
        }
        (None, false) => println!("Nothing staged"),
    }

    Ok(())
}
