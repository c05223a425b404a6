//! Validate configuration command.

use anyhow::Result;
use finalert_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);
    if !config_path.exists() {
        println!("File not found, checking defaults and environment only.");
    }

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let problems = config.problems();
    if !problems.is_empty() {
        println!("Configuration has {} problem(s):", problems.len());
        for problem in &problems {
            println!("  - {}", problem);
        }
        anyhow::bail!("Invalid configuration");
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Alert interval: {}s", config.alerts.interval_secs);
    println!("Report interval: {}s", config.notifications.interval_secs);
    println!("Cache TTL: {}s", config.market_data.cache_ttl_secs);
    println!("Snapshot timeout: {}s", config.market_data.snapshot_timeout_secs);
    println!("Store: {}", config.storage.path);
    for (asset_class, chain) in config.sources.chains() {
        println!(
            "Sources ({}): {} -> {}",
            asset_class,
            chain.order.join(", "),
            chain.fallback
        );
    }

    Ok(())
}
