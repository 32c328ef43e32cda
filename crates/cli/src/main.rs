//! dreampost CLI entry point

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();

    match cli.command {
        // Runs before any config file exists
        Commands::Config(args) => {
            init_logging(log_level.unwrap_or("info"))?;
            commands::config::execute(args).await
        }
        Commands::Generate(args) => {
            let config = setup(config_path, log_level)?;
            commands::generate::execute(args, &config).await
        }
        Commands::Publish(args) => {
            let config = setup(config_path, log_level)?;
            commands::publish::execute(args, &config).await
        }
        Commands::Show(args) => {
            let config = setup(config_path, log_level)?;
            commands::show::execute(args, &config).await
        }
        // Reports a broken config instead of failing on it
        Commands::Doctor(args) => {
            init_logging(log_level.unwrap_or("warn"))?;
            commands::doctor::execute(args, config_path).await
        }
    }
}

/// Load configuration, then install logging at the effective level
fn setup(config_path: Option<&Path>, log_level: Option<&str>) -> Result<AppConfig> {
    let config = AppConfig::load(config_path)?;
    init_logging(log_level.unwrap_or(config.general.log_level.as_str()))?;
    Ok(config)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
