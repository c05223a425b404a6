//! Payload parsers that turn a page or API body into quotes.
//!
//! A parser returns `Err` only when the payload does not have the expected
//! shape at all (schema drift). A well-formed payload that lacks every
//! tracked symbol yields an empty map.

mod html;
mod json;
mod xml;

pub use html::{CodeCards, KeyedRows, NamedRowTable, RowValues};
pub use json::{json_decimal, CollectApiJson, FieldPair, KeyedJson};
pub use xml::CentralBankXml;

use finalert_core::{try_parse_price, AssetClass, AssetQuote, QuoteMap};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

/// Parses one upstream payload format.
pub trait QuoteParser: Send + Sync {
    /// Parse `body` into quotes of `asset_class`.
    ///
    /// # Returns
    /// Quotes keyed by normalized symbol, or a message describing why the
    /// payload could not be understood.
    fn parse(&self, asset_class: AssetClass, body: &str) -> Result<QuoteMap, String>;
}

/// Read machine-formatted text (`40.260`) as-is and fall back to the
/// locale-aware parser for display text (`3.245,10`).
pub(crate) fn decimal_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim())
        .ok()
        .or_else(|| try_parse_price(text))
}

/// Insert a two-sided quote unless the symbol is already present or the
/// values are not usable prices.
pub(crate) fn insert_two_sided(
    quotes: &mut QuoteMap,
    asset_class: AssetClass,
    symbol: &str,
    bid: Option<Decimal>,
    ask: Option<Decimal>,
) {
    let (Some(bid), Some(ask)) = (bid, ask) else {
        return;
    };
    match AssetQuote::two_sided(asset_class, symbol, bid, ask) {
        Ok(quote) => {
            quotes.entry(quote.symbol.clone()).or_insert(quote);
        }
        Err(e) => trace!(symbol, error = %e, "Skipping row"),
    }
}

/// Insert a last-value quote with an optional daily change.
pub(crate) fn insert_last(
    quotes: &mut QuoteMap,
    asset_class: AssetClass,
    symbol: &str,
    last: Option<Decimal>,
    change_percent: Option<Decimal>,
) {
    let Some(last) = last else {
        return;
    };
    match AssetQuote::last(asset_class, symbol, last, change_percent.unwrap_or_default()) {
        Ok(quote) => {
            quotes.entry(quote.symbol.clone()).or_insert(quote);
        }
        Err(e) => trace!(symbol, error = %e, "Skipping row"),
    }
}
