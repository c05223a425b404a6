//! Configuration structures.

use finalert_core::AssetClass;
use finalert_data::{builtin_source, ChainSpec, RequestDefaults, DEFAULT_USER_AGENTS};
use finalert_notify::{DEFAULT_API_BASE, DEFAULT_TOKEN_ENV};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// A configuration value that cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSetting {
    #[error("{section}.interval_secs must be positive")]
    ZeroInterval { section: &'static str },

    #[error("{section}.cycle_timeout_secs ({timeout}) must be shorter than interval_secs ({interval})")]
    CycleTimeout {
        section: &'static str,
        timeout: u64,
        interval: u64,
    },

    #[error("sources.{asset_class}: unknown source '{label}'")]
    UnknownSource {
        asset_class: AssetClass,
        label: String,
    },

    #[error("sources.{asset_class}: fallback '{label}' is also listed in order")]
    FallbackInOrder {
        asset_class: AssetClass,
        label: String,
    },

    #[error("sources.{asset_class}.overrides.{label}: jitter_min_ms ({min}) exceeds jitter_max_ms ({max})")]
    JitterRange {
        asset_class: AssetClass,
        label: String,
        min: u64,
        max: u64,
    },

    #[error("market_data.cache_ttl_secs ({ttl}) exceeds the shortest poll interval ({interval})")]
    CacheTtl { ttl: u64, interval: u64 },

    #[error("market_data.request_timeout_ms must be positive")]
    ZeroRequestTimeout,

    #[error("market_data.snapshot_timeout_secs ({timeout}) must be positive and shorter than the shortest cycle timeout ({cycle_timeout})")]
    SnapshotTimeout { timeout: u64, cycle_timeout: u64 },
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub market_data: MarketDataSettings,
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl AppConfig {
    /// Collect every problem with this configuration.
    pub fn problems(&self) -> Vec<InvalidSetting> {
        let mut problems = Vec::new();
        self.alerts.poll().check("alerts", &mut problems);
        self.notifications.poll().check("notifications", &mut problems);

        if self.market_data.request_timeout_ms == 0 {
            problems.push(InvalidSetting::ZeroRequestTimeout);
        }
        let shortest = self
            .alerts
            .interval_secs
            .min(self.notifications.interval_secs);
        if self.market_data.cache_ttl_secs > shortest {
            problems.push(InvalidSetting::CacheTtl {
                ttl: self.market_data.cache_ttl_secs,
                interval: shortest,
            });
        }
        let cycle_timeout = self
            .alerts
            .cycle_timeout_secs
            .min(self.notifications.cycle_timeout_secs);
        let snapshot_timeout = self.market_data.snapshot_timeout_secs;
        if snapshot_timeout == 0 || snapshot_timeout >= cycle_timeout {
            problems.push(InvalidSetting::SnapshotTimeout {
                timeout: snapshot_timeout,
                cycle_timeout,
            });
        }

        for (asset_class, chain) in self.sources.chains() {
            check_chain(asset_class, &chain, &mut problems);
        }
        problems
    }

    /// Validate the configuration, reporting the first problem found.
    pub fn validate(&self) -> Result<(), InvalidSetting> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}

fn check_chain(asset_class: AssetClass, chain: &ChainSpec, problems: &mut Vec<InvalidSetting>) {
    let unknown = |label: &str| InvalidSetting::UnknownSource {
        asset_class,
        label: label.to_string(),
    };

    for label in &chain.order {
        if builtin_source(asset_class, label).is_none() {
            problems.push(unknown(label));
        }
    }
    if builtin_source(asset_class, &chain.fallback).is_none() {
        problems.push(unknown(&chain.fallback));
    }
    if chain.order.contains(&chain.fallback) {
        problems.push(InvalidSetting::FallbackInOrder {
            asset_class,
            label: chain.fallback.clone(),
        });
    }

    for (label, tuning) in &chain.overrides {
        let Some(info) = builtin_source(asset_class, label) else {
            problems.push(unknown(label));
            continue;
        };
        let min = tuning.jitter_min_ms.unwrap_or(info.jitter_ms.0);
        let max = tuning.jitter_max_ms.unwrap_or(info.jitter_ms.1);
        if min > max {
            problems.push(InvalidSetting::JitterRange {
                asset_class,
                label: label.clone(),
                min,
                max,
            });
        }
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "finalert".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Telegram bot settings. The token itself is read from `token_env`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelegramSettings {
    pub token_env: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: "data/finalert.json".to_string(),
        }
    }
}

/// Alert evaluation timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertSettings {
    pub interval_secs: u64,
    /// Upper bound on one cycle; a longer cycle is abandoned
    pub cycle_timeout_secs: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            interval_secs: 240,
            cycle_timeout_secs: 90,
        }
    }
}

impl AlertSettings {
    pub fn poll(&self) -> PollSettings {
        PollSettings {
            interval_secs: self.interval_secs,
            cycle_timeout_secs: self.cycle_timeout_secs,
        }
    }
}

/// Recurring report timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationSettings {
    pub interval_secs: u64,
    pub cycle_timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            interval_secs: 120,
            cycle_timeout_secs: 90,
        }
    }
}

impl NotificationSettings {
    pub fn poll(&self) -> PollSettings {
        PollSettings {
            interval_secs: self.interval_secs,
            cycle_timeout_secs: self.cycle_timeout_secs,
        }
    }
}

/// Timer of one periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval_secs: u64,
    pub cycle_timeout_secs: u64,
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs)
    }

    fn check(&self, section: &'static str, problems: &mut Vec<InvalidSetting>) {
        if self.interval_secs == 0 {
            problems.push(InvalidSetting::ZeroInterval { section });
        } else if self.cycle_timeout_secs >= self.interval_secs {
            problems.push(InvalidSetting::CycleTimeout {
                section,
                timeout: self.cycle_timeout_secs,
                interval: self.interval_secs,
            });
        }
    }
}

/// Shared market data settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketDataSettings {
    /// How long a snapshot is reused; 0 fetches on every call
    pub cache_ttl_secs: u64,
    /// Per asset class limit on one snapshot, fallbacks included
    pub snapshot_timeout_secs: u64,
    pub request_timeout_ms: u64,
    pub user_agents: Vec<String>,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 0,
            snapshot_timeout_secs: 60,
            request_timeout_ms: 10_000,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

impl MarketDataSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_timeout_secs)
    }

    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            timeout: Duration::from_millis(self.request_timeout_ms),
            user_agents: self.user_agents.clone(),
        }
    }
}

/// Source chain per asset class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcesConfig {
    #[serde(default = "SourcesConfig::currency_default")]
    pub currency: ChainSpec,
    #[serde(default = "SourcesConfig::metal_default")]
    pub metal: ChainSpec,
    #[serde(default = "SourcesConfig::equity_default")]
    pub equity: ChainSpec,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            currency: Self::currency_default(),
            metal: Self::metal_default(),
            equity: Self::equity_default(),
        }
    }
}

impl SourcesConfig {
    fn currency_default() -> ChainSpec {
        ChainSpec::default_for(AssetClass::Currency)
    }

    fn metal_default() -> ChainSpec {
        ChainSpec::default_for(AssetClass::Metal)
    }

    fn equity_default() -> ChainSpec {
        ChainSpec::default_for(AssetClass::Equity)
    }

    /// Chain specs keyed by asset class.
    pub fn chains(&self) -> BTreeMap<AssetClass, ChainSpec> {
        BTreeMap::from([
            (AssetClass::Currency, self.currency.clone()),
            (AssetClass::Metal, self.metal.clone()),
            (AssetClass::Equity, self.equity.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finalert_data::SourceTuning;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.alerts.interval_secs, 240);
        assert_eq!(config.notifications.interval_secs, 120);
        assert_eq!(config.sources.metal.fallback, "collectapi");
        assert_eq!(config.problems(), Vec::new());
    }

    #[test]
    fn test_cycle_timeout_must_be_shorter_than_interval() {
        let mut config = AppConfig::default();
        config.notifications.cycle_timeout_secs = 120;
        assert_eq!(
            config.validate(),
            Err(InvalidSetting::CycleTimeout {
                section: "notifications",
                timeout: 120,
                interval: 120,
            })
        );

        config.notifications.interval_secs = 0;
        assert_eq!(
            config.validate(),
            Err(InvalidSetting::ZeroInterval {
                section: "notifications"
            })
        );
    }

    #[test]
    fn test_cache_ttl_bounded_by_shortest_interval() {
        let mut config = AppConfig::default();
        config.market_data.cache_ttl_secs = 60;
        assert!(config.validate().is_ok());

        config.market_data.cache_ttl_secs = 121;
        assert_eq!(
            config.validate(),
            Err(InvalidSetting::CacheTtl {
                ttl: 121,
                interval: 120
            })
        );
    }

    #[test]
    fn test_snapshot_timeout_fits_inside_cycle() {
        let mut config = AppConfig::default();
        assert_eq!(config.market_data.snapshot_timeout(), Duration::from_secs(60));

        config.market_data.snapshot_timeout_secs = 90;
        assert_eq!(
            config.validate(),
            Err(InvalidSetting::SnapshotTimeout {
                timeout: 90,
                cycle_timeout: 90
            })
        );

        config.market_data.snapshot_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_problems() {
        let mut config = AppConfig::default();
        config.sources.currency.order.push("tcmb".into());
        config.sources.equity.order.insert(0, "bloomberg".into());
        config.sources.metal.overrides.insert(
            "trt".into(),
            SourceTuning {
                jitter_min_ms: Some(2000),
                ..SourceTuning::default()
            },
        );

        let problems = config.problems();
        assert_eq!(problems.len(), 3);
        assert!(problems.contains(&InvalidSetting::FallbackInOrder {
            asset_class: AssetClass::Currency,
            label: "tcmb".into()
        }));
        assert!(problems.contains(&InvalidSetting::UnknownSource {
            asset_class: AssetClass::Equity,
            label: "bloomberg".into()
        }));
        assert!(problems.contains(&InvalidSetting::JitterRange {
            asset_class: AssetClass::Metal,
            label: "trt".into(),
            min: 2000,
            max: 800
        }));
    }

    #[test]
    fn test_template_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[sources.currency]"));
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
