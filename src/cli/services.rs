//! Wiring of collaborators from configuration.

use anyhow::{Context, Result};
use finalert_config::AppConfig;
use finalert_core::Messenger;
use finalert_data::{build_market_data, MarketDataCache};
use finalert_notify::{LogMessenger, TelegramConfig, TelegramMessenger};
use finalert_store::JsonFileStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Market data facade built from the configured source chains.
pub fn market_data(config: &AppConfig) -> Result<Arc<MarketDataCache>> {
    let market = build_market_data(
        &config.sources.chains(),
        config.market_data.request_defaults(),
        config.market_data.cache_ttl(),
    )
    .context("Failed to build source chains")?;
    Ok(Arc::new(market))
}

pub async fn store(config: &AppConfig) -> Result<Arc<JsonFileStore>> {
    let store = JsonFileStore::open(&config.storage.path)
        .await
        .with_context(|| format!("Failed to open store at {}", config.storage.path))?;
    Ok(Arc::new(store))
}

/// Telegram delivery, or log-only delivery for dry runs.
pub fn messenger(config: &AppConfig, dry_run: bool) -> Result<Arc<dyn Messenger>> {
    if dry_run {
        info!("Dry run: messages are logged, not sent");
        return Ok(Arc::new(LogMessenger::new()));
    }

    let telegram = TelegramConfig::from_env(&config.telegram.token_env)
        .context("Telegram token missing (use --dry-run to log messages instead)")?
        .with_api_base(config.telegram.api_base.clone())
        .with_timeout(Duration::from_secs(config.telegram.timeout_secs));
    let messenger = TelegramMessenger::new(telegram).context("Failed to create Telegram client")?;
    Ok(Arc::new(messenger))
}

/// Load-time validation shared by commands that touch the network or store.
pub fn ensure_valid(config: &AppConfig) -> Result<()> {
    config.validate().context("Invalid configuration")
}
