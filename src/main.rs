//! finalert CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use finalert_config::{load_config, AppConfig};
use finalert_monitor::setup_logging;
use std::path::Path;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging settings come from the config file when it loads
    let loaded = load_config(&cli.config);
    let defaults = AppConfig::default();
    let logging = loaded.as_ref().map(|c| &c.logging).unwrap_or(&defaults.logging);
    let level = cli
        .log_level
        .as_ref()
        .map(|l| l.as_str())
        .unwrap_or(logging.level.as_str());
    let json = cli.json_logs || logging.is_json();
    let _guard = setup_logging(level, json, logging.file.as_deref().map(Path::new))?;

    match cli.command {
        Commands::ValidateConfig => return cli::commands::validate::run(&cli.config).await,
        Commands::ConfigTemplate => return cli::commands::template::run().await,
        _ => {}
    }

    if !cli.config.exists() {
        warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    let config = loaded?;

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &config).await,
        Commands::Check(args) => cli::commands::check::run(args, &config).await,
        Commands::Snapshot(args) => cli::commands::snapshot::run(args, &config).await,
        Commands::Sources => cli::commands::sources::run(&config).await,
        Commands::Alert(command) => cli::commands::alert::run(command, &config).await,
        Commands::Notify(command) => cli::commands::notify::run(command, &config).await,
        Commands::ValidateConfig | Commands::ConfigTemplate => Ok(()),
    }
}
