//! Configuration management.
//!
//! Settings come from an optional TOML file overlaid with `FINALERT_*`
//! environment variables, nested keys separated by `__`
//! (`FINALERT_ALERTS__INTERVAL_SECS=180`).

mod settings;

pub use settings::{
    AlertSettings, AppConfig, AppSettings, InvalidSetting, LoggingConfig, MarketDataSettings,
    NotificationSettings, PollSettings, SourcesConfig, StorageSettings, TelegramSettings,
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FINALERT";

/// Load configuration from file and environment.
///
/// A missing file is not an error; defaults apply.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_with_prefix(path, ENV_PREFIX)
}

fn load_with_prefix(path: &Path, prefix: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Default configuration rendered as TOML.
pub fn config_template() -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&AppConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            load_with_prefix(&dir.path().join("absent.toml"), "FINALERT_TEST_ABSENT").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finalert.toml");
        std::fs::write(
            &path,
            r#"
[alerts]
interval_secs = 180
cycle_timeout_secs = 60

[storage]
path = "/var/lib/finalert/store.json"

[sources.currency]
order = ["mynet", "sabah"]
fallback = "tcmb"

[sources.currency.overrides.mynet]
timeout_ms = 4000
"#,
        )
        .unwrap();

        let config = load_with_prefix(&path, "FINALERT_TEST_FILE").unwrap();
        assert_eq!(config.alerts.interval_secs, 180);
        assert_eq!(config.notifications, NotificationSettings::default());
        assert_eq!(config.storage.path, "/var/lib/finalert/store.json");
        assert_eq!(config.sources.currency.order, vec!["mynet", "sabah"]);
        assert_eq!(
            config.sources.currency.overrides["mynet"].timeout_ms,
            Some(4000)
        );
        assert!(config.sources.currency.overrides["mynet"].enabled);
        assert_eq!(config.sources.metal.fallback, "collectapi");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides_file() {
        std::env::set_var("FINALERT_TEST_ENV_ALERTS__INTERVAL_SECS", "300");
        let dir = tempfile::tempdir().unwrap();
        let config = load_with_prefix(&dir.path().join("absent.toml"), "FINALERT_TEST_ENV").unwrap();
        std::env::remove_var("FINALERT_TEST_ENV_ALERTS__INTERVAL_SECS");

        assert_eq!(config.alerts.interval_secs, 300);
        assert_eq!(config.alerts.cycle_timeout_secs, 90);
    }

    #[test]
    fn test_template_parses() {
        let template = config_template().unwrap();
        let parsed: AppConfig = toml::from_str(&template).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
