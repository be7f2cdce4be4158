//! feed-doctor CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging: --log-level, then the config file, then info
    let log_level = match cli.log_level {
        Some(ref level) => level.clone(),
        None => configured_log_level(cli.config.as_deref()),
    };
    init_logging(&log_level)?;

    let global = commands::GlobalOpts {
        config: cli.config,
        catalog: cli.catalog,
        db: cli.db,
    };

    // Execute command
    match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args, global).await,
        Commands::Bulk(args) => commands::bulk::execute(args, global).await,
        Commands::Stats(args) => commands::stats::execute(args, global).await,
        Commands::Results(args) => commands::results::list(args, global).await,
        Commands::Result(args) => commands::results::show(args, global).await,
        Commands::Review(args) => commands::review::execute(args, global).await,
        Commands::Fix(args) => commands::fix::execute(args, global).await,
        Commands::SeoTitle(args) => commands::seo_title::execute(args, global).await,
        Commands::Config(args) => commands::config::execute(args).await,
        Commands::Doctor(args) => commands::doctor::execute(args, global).await,
    }
}

/// Log level from configuration, falling back to info when it cannot load.
/// Load errors surface again once the command reads its config.
fn configured_log_level(config_path: Option<&Path>) -> String {
    AppConfig::load(config_path)
        .map(|config| config.general.log_level)
        .unwrap_or_else(|_| "info".to_string())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
