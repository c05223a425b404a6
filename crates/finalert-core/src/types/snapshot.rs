//! Snapshots of one asset class with provenance.

use crate::error::EmptySnapshotError;
use crate::types::{AssetClass, AssetQuote, QuoteMap};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which upstream source produced a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// One of the ordered sources answered with data
    Live(String),
    /// Every ordered source failed; the last-resort source answered
    LastResort(String),
    /// Every source failed, the last-resort one included
    Unavailable(String),
}

impl Provenance {
    /// Label of the source behind the snapshot.
    pub fn source(&self) -> &str {
        match self {
            Provenance::Live(source)
            | Provenance::LastResort(source)
            | Provenance::Unavailable(source) => source,
        }
    }

    /// Check if the primary sources were bypassed.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Provenance::Live(_))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Live(source) => write!(f, "{}", source),
            Provenance::LastResort(source) => write!(f, "{} (last resort)", source),
            Provenance::Unavailable(source) => write!(f, "{} (no data)", source),
        }
    }
}

/// Quotes of one asset class fetched in a single chain invocation.
///
/// A snapshot may be empty when every source failed. Callers must treat an
/// absent symbol as "no data", never as a zero price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Asset class
    pub asset_class: AssetClass,
    /// Quotes keyed by normalized symbol
    pub quotes: QuoteMap,
    /// Source that produced the quotes
    pub provenance: Provenance,
    /// When the quotes were fetched
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a new snapshot stamped with the current time.
    pub fn new(asset_class: AssetClass, quotes: QuoteMap, provenance: Provenance) -> Self {
        Self {
            asset_class,
            quotes,
            provenance,
            fetched_at: Utc::now(),
        }
    }

    /// Create an empty snapshot for a chain that produced nothing.
    pub fn unavailable(asset_class: AssetClass, fallback: impl Into<String>) -> Self {
        Self::new(
            asset_class,
            QuoteMap::new(),
            Provenance::Unavailable(fallback.into()),
        )
    }

    /// Look up a quote. The symbol is normalized for the asset class first.
    pub fn get(&self, symbol: &str) -> Option<&AssetQuote> {
        self.quotes
            .get(symbol)
            .or_else(|| self.quotes.get(&self.asset_class.normalize_symbol(symbol)))
    }

    /// Current price of a symbol, if the snapshot has it.
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.get(symbol).map(AssetQuote::price)
    }

    /// Label of the source behind the snapshot.
    pub fn source(&self) -> &str {
        self.provenance.source()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Get the snapshot age relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Quotes in display order: tracked symbols first, then the rest by key.
    pub fn ordered_quotes(&self) -> Vec<&AssetQuote> {
        let tracked = self.asset_class.tracked_symbols();
        let mut quotes: Vec<&AssetQuote> = tracked
            .iter()
            .filter_map(|symbol| self.quotes.get(*symbol))
            .collect();
        quotes.extend(
            self.quotes
                .values()
                .filter(|quote| !tracked.contains(&quote.symbol.as_str())),
        );
        quotes
    }

    /// Fail when the snapshot has no quotes at all.
    pub fn ensure_populated(self) -> Result<Self, EmptySnapshotError> {
        if self.is_empty() {
            return Err(EmptySnapshotError {
                asset_class: self.asset_class,
                fallback: self.provenance.source().to_string(),
            });
        }
        Ok(self)
    }
}
