//! Registry of built-in sources and chain assembly from configuration.

use crate::cache::MarketDataCache;
use crate::chain::SourceChain;
use crate::classify::{classify_currency, classify_metal, classify_mynet_metal};
use crate::fetchers::{PageFetcher, RateApiFetcher, YahooChartFetcher};
use crate::parse::{
    CentralBankXml, CodeCards, CollectApiJson, FieldPair, KeyedJson, KeyedRows, NamedRowTable,
    RowValues,
};
use crate::source::{Jitter, SourceSpec};
use crate::transport::Transport;
use finalert_core::{AssetClass, Fetcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building chains.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown {asset_class} source: {label}")]
    UnknownSource {
        asset_class: AssetClass,
        label: String,
    },

    #[error("{asset_class} source {label} is disabled")]
    Disabled {
        asset_class: AssetClass,
        label: String,
    },
}

/// Information about a built-in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    /// Label used in configuration, logs, and provenance
    pub label: &'static str,
    pub asset_class: AssetClass,
    /// Default endpoint
    pub url: &'static str,
    pub description: &'static str,
    /// Default jitter bounds in milliseconds
    pub jitter_ms: (u64, u64),
}

/// Per-source overrides from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTuning {
    pub enabled: bool,
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub jitter_min_ms: Option<u64>,
    pub jitter_max_ms: Option<u64>,
}

impl Default for SourceTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
            timeout_ms: None,
            jitter_min_ms: None,
            jitter_max_ms: None,
        }
    }
}

/// Order of ordered sources and the last-resort source for one asset class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub order: Vec<String>,
    pub fallback: String,
    #[serde(default)]
    pub overrides: BTreeMap<String, SourceTuning>,
}

impl ChainSpec {
    /// Built-in order for an asset class.
    pub fn default_for(asset_class: AssetClass) -> Self {
        let (order, fallback): (&[&str], &str) = match asset_class {
            AssetClass::Currency => (
                &["sabah", "mynet", "dovizcom", "bigpara", "exchangerate-api", "dovizcom-api"],
                "tcmb",
            ),
            AssetClass::Metal => (&["mynet", "bigpara", "trt", "genelpara"], "collectapi"),
            AssetClass::Equity => (&["yahoo", "genelpara", "bigpara"], "foreks"),
        };
        Self {
            order: order.iter().map(|s| s.to_string()).collect(),
            fallback: fallback.to_string(),
            overrides: BTreeMap::new(),
        }
    }

    fn tuning(&self, label: &str) -> SourceTuning {
        self.overrides.get(label).cloned().unwrap_or_default()
    }
}

/// Shared request defaults applied before per-source overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDefaults {
    pub timeout: Duration,
    pub user_agents: Vec<String>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agents: Vec::new(),
        }
    }
}

const fn info(
    label: &'static str,
    asset_class: AssetClass,
    url: &'static str,
    description: &'static str,
    jitter_ms: (u64, u64),
) -> SourceInfo {
    SourceInfo {
        label,
        asset_class,
        url,
        description,
        jitter_ms,
    }
}

const PAGE: (u64, u64) = (300, 800);
const API: (u64, u64) = (300, 600);

static BUILTIN: &[SourceInfo] = &[
    info("sabah", AssetClass::Currency, "https://www.sabah.com.tr/finans/doviz-kurlari", "Sabah currency table", PAGE),
    info("mynet", AssetClass::Currency, "https://finans.mynet.com/doviz/", "Mynet currency table", PAGE),
    info("dovizcom", AssetClass::Currency, "https://kur.doviz.com/", "Doviz.com currency cards", PAGE),
    info("bigpara", AssetClass::Currency, "https://bigpara.hurriyet.com.tr/doviz/", "Bigpara currency rows", PAGE),
    info("exchangerate-api", AssetClass::Currency, "https://api.exchangerate-api.com/v4/latest/{symbol}", "ExchangeRate-API mid rates", API),
    info("dovizcom-api", AssetClass::Currency, "https://api.doviz.com/api/v1/currencies/all/latest", "Doviz.com JSON API", API),
    info("tcmb", AssetClass::Currency, "https://www.tcmb.gov.tr/kurlar/today.xml", "Central bank banknote rates", API),
    info("mynet", AssetClass::Metal, "https://finans.mynet.com/altin/", "Mynet gold table", PAGE),
    info("bigpara", AssetClass::Metal, "https://bigpara.hurriyet.com.tr/altin/", "Bigpara gold rows", PAGE),
    info("trt", AssetClass::Metal, "https://www.trthaber.com/finans/altin/", "TRT Haber gold tables", PAGE),
    info("genelpara", AssetClass::Metal, "https://api.genelpara.com/embed/altin.json", "GenelPara gold JSON", API),
    info("collectapi", AssetClass::Metal, "https://api.collectapi.com/economy/goldPrice", "CollectAPI gold prices", API),
    info("yahoo", AssetClass::Equity, "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}?range=1d&interval=1d", "Yahoo Finance charts", API),
    info("genelpara", AssetClass::Equity, "https://api.genelpara.com/embed/borsa.json", "GenelPara equities JSON", API),
    info("bigpara", AssetClass::Equity, "https://bigpara.hurriyet.com.tr/borsa/canli-borsa/", "Bigpara live equities", PAGE),
    info("foreks", AssetClass::Equity, "https://www.foreks.com/analizler/piyasa-verileri/hisse/", "Foreks equities table", PAGE),
];

const METAL_ROWS: &[(&str, &str)] = &[
    ("gram-altin", "gram"),
    ("ceyrek-altin", "ceyrek"),
    ("yarim-altin", "yarim"),
    ("tam-altin", "tam"),
    ("cumhuriyet-altini", "cumhuriyet"),
    ("ons-altin", "ons"),
];

const METAL_CODES: &[(&str, &str)] = &[
    ("GA", "gram"),
    ("C", "ceyrek"),
    ("Y", "yarim"),
    ("T", "tam"),
    ("ONS", "ons"),
];

/// Look up a built-in source without a registry instance.
pub fn builtin_source(asset_class: AssetClass, label: &str) -> Option<&'static SourceInfo> {
    BUILTIN
        .iter()
        .find(|info| info.asset_class == asset_class && info.label == label)
}

/// Registry for the built-in sources.
pub struct SourceRegistry {
    transport: Arc<dyn Transport>,
    defaults: RequestDefaults,
}

impl SourceRegistry {
    /// Create a registry whose fetchers share `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            defaults: RequestDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// List the built-in sources of an asset class.
    pub fn list(&self, asset_class: AssetClass) -> Vec<&'static SourceInfo> {
        BUILTIN
            .iter()
            .filter(|info| info.asset_class == asset_class)
            .collect()
    }

    /// Get source info by label.
    pub fn get(&self, asset_class: AssetClass, label: &str) -> Option<&'static SourceInfo> {
        builtin_source(asset_class, label)
    }

    /// Check if a source exists.
    pub fn exists(&self, asset_class: AssetClass, label: &str) -> bool {
        self.get(asset_class, label).is_some()
    }

    fn spec(&self, info: &SourceInfo, tuning: &SourceTuning) -> SourceSpec {
        let jitter = Jitter::from_millis(
            tuning.jitter_min_ms.unwrap_or(info.jitter_ms.0),
            tuning.jitter_max_ms.unwrap_or(info.jitter_ms.1),
        );
        let timeout = tuning
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.defaults.timeout);

        SourceSpec::new(
            info.label,
            info.asset_class,
            tuning.url.clone().unwrap_or_else(|| info.url.to_string()),
        )
        .with_timeout(timeout)
        .with_jitter(jitter)
        .with_user_agents(&self.defaults.user_agents)
    }

    /// Create a fetcher instance.
    pub fn create(
        &self,
        asset_class: AssetClass,
        label: &str,
        tuning: &SourceTuning,
    ) -> Result<Arc<dyn Fetcher>, RegistryError> {
        let info = self
            .get(asset_class, label)
            .ok_or_else(|| RegistryError::UnknownSource {
                asset_class,
                label: label.to_string(),
            })?;
        if !tuning.enabled {
            return Err(RegistryError::Disabled {
                asset_class,
                label: label.to_string(),
            });
        }

        let spec = self.spec(info, tuning);
        let transport = self.transport.clone();
        let currencies = AssetClass::Currency.tracked_symbols();
        let equities = AssetClass::Equity.tracked_symbols();
        let two_sided = RowValues::TwoSided {
            bid_col: 1,
            ask_col: 2,
        };
        let last_with_change = RowValues::Last {
            value_col: 1,
            change_col: Some(2),
        };

        let fetcher: Arc<dyn Fetcher> = match (asset_class, label) {
            (AssetClass::Currency, "sabah") => Arc::new(PageFetcher::new(
                spec,
                transport,
                NamedRowTable::new(classify_currency),
            )),
            (AssetClass::Currency, "mynet") => Arc::new(PageFetcher::new(
                spec,
                transport,
                NamedRowTable::new(classify_currency).with_columns(0, 3, 4),
            )),
            (AssetClass::Currency, "dovizcom") => Arc::new(PageFetcher::new(
                spec,
                transport,
                CodeCards::new(currencies.iter().copied()),
            )),
            (AssetClass::Currency, "bigpara") => Arc::new(PageFetcher::new(
                spec,
                transport,
                KeyedRows::new(
                    "data-name",
                    [("dolar", "USD"), ("euro", "EUR"), ("sterlin", "GBP")],
                    two_sided,
                ),
            )),
            (AssetClass::Currency, "exchangerate-api") => Arc::new(RateApiFetcher::new(
                spec,
                transport,
                currencies.iter().copied(),
            )),
            (AssetClass::Currency, "dovizcom-api") => Arc::new(PageFetcher::new(
                spec,
                transport,
                KeyedJson::new(
                    currencies.iter().map(|code| (*code, *code)),
                    FieldPair::two_sided("buying", "selling"),
                ),
            )),
            (AssetClass::Currency, "tcmb") => Arc::new(PageFetcher::new(
                spec,
                transport,
                CentralBankXml::new(currencies.iter().copied()),
            )),
            (AssetClass::Metal, "mynet") => Arc::new(PageFetcher::new(
                spec,
                transport,
                NamedRowTable::new(classify_mynet_metal).with_columns(0, 3, 4),
            )),
            (AssetClass::Metal, "bigpara") => Arc::new(PageFetcher::new(
                spec,
                transport,
                KeyedRows::new("data-name", METAL_ROWS.iter().copied(), two_sided),
            )),
            (AssetClass::Metal, "trt") => Arc::new(PageFetcher::new(
                spec,
                transport,
                NamedRowTable::new(classify_metal)
                    .with_containers("table[class*=table], div[class*=table]")
                    .with_cells("td, th"),
            )),
            (AssetClass::Metal, "genelpara") => Arc::new(PageFetcher::new(
                spec,
                transport,
                KeyedJson::new(METAL_CODES.iter().copied(), FieldPair::two_sided("alis", "satis")),
            )),
            (AssetClass::Metal, "collectapi") => Arc::new(PageFetcher::new(
                spec,
                transport,
                CollectApiJson::new(classify_metal),
            )),
            (AssetClass::Equity, "yahoo") => Arc::new(YahooChartFetcher::new(
                spec,
                transport,
                equities.iter().copied(),
            )),
            (AssetClass::Equity, "genelpara") => Arc::new(PageFetcher::new(
                spec,
                transport,
                KeyedJson::new(
                    equities.iter().map(|code| (*code, *code)),
                    FieldPair::last("d", "dd"),
                ),
            )),
            (AssetClass::Equity, "bigpara") | (AssetClass::Equity, "foreks") => {
                Arc::new(PageFetcher::new(
                    spec,
                    transport,
                    KeyedRows::new(
                        "data-code",
                        equities.iter().map(|code| (*code, *code)),
                        last_with_change,
                    ),
                ))
            }
            _ => {
                return Err(RegistryError::UnknownSource {
                    asset_class,
                    label: label.to_string(),
                })
            }
        };

        Ok(fetcher)
    }

    /// Build a chain from its configuration.
    ///
    /// Disabled ordered sources are skipped. The last-resort source cannot be
    /// disabled.
    pub fn build_chain(
        &self,
        asset_class: AssetClass,
        spec: &ChainSpec,
    ) -> Result<SourceChain, RegistryError> {
        let mut fetchers = Vec::with_capacity(spec.order.len());
        for label in &spec.order {
            let tuning = spec.tuning(label);
            if !tuning.enabled {
                if !self.exists(asset_class, label) {
                    return Err(RegistryError::UnknownSource {
                        asset_class,
                        label: label.clone(),
                    });
                }
                continue;
            }
            fetchers.push(self.create(asset_class, label, &tuning)?);
        }

        let fallback_tuning = SourceTuning {
            enabled: true,
            ..spec.tuning(&spec.fallback)
        };
        let last_resort = self.create(asset_class, &spec.fallback, &fallback_tuning)?;

        Ok(SourceChain::new(asset_class, fetchers, last_resort))
    }

    /// Build the market data facade from one chain spec per asset class.
    pub fn build_market_data(
        &self,
        chains: &BTreeMap<AssetClass, ChainSpec>,
        ttl: Duration,
    ) -> Result<MarketDataCache, RegistryError> {
        let build = |asset_class: AssetClass| {
            let spec = chains
                .get(&asset_class)
                .cloned()
                .unwrap_or_else(|| ChainSpec::default_for(asset_class));
            self.build_chain(asset_class, &spec)
        };

        Ok(MarketDataCache::new(
            build(AssetClass::Currency)?,
            build(AssetClass::Metal)?,
            build(AssetClass::Equity)?,
        )
        .with_ttl(ttl))
    }
}
