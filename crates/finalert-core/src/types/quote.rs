//! Normalized quote records.

use crate::error::ValidationError;
use crate::types::AssetClass;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quotes of one asset class keyed by normalized symbol.
pub type QuoteMap = BTreeMap<String, AssetQuote>;

/// Current price of one instrument, as produced by a fetcher.
///
/// `ask` is the sell price for currencies and gold and the last traded
/// value for equities. It is always positive, and never below `bid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetQuote {
    /// Asset class
    pub asset_class: AssetClass,
    /// Normalized symbol
    pub symbol: String,
    /// Buy price, when the source publishes one
    pub bid: Option<Decimal>,
    /// Sell price or last value
    pub ask: Decimal,
    /// Daily change percentage (equities)
    pub change_percent: Option<Decimal>,
}

impl AssetQuote {
    /// Create a validated quote. The symbol is normalized for the asset class.
    pub fn new(
        asset_class: AssetClass,
        symbol: &str,
        bid: Option<Decimal>,
        ask: Decimal,
    ) -> Result<Self, ValidationError> {
        let symbol = asset_class.normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if ask <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(ask));
        }
        if let Some(bid) = bid {
            if bid <= Decimal::ZERO {
                return Err(ValidationError::NonPositivePrice(bid));
            }
            if bid > ask {
                return Err(ValidationError::CrossedQuote { bid, ask });
            }
        }

        Ok(Self {
            asset_class,
            symbol,
            bid,
            ask,
            change_percent: None,
        })
    }

    /// Create a two-sided quote (buy and sell).
    pub fn two_sided(
        asset_class: AssetClass,
        symbol: &str,
        bid: Decimal,
        ask: Decimal,
    ) -> Result<Self, ValidationError> {
        Self::new(asset_class, symbol, Some(bid), ask)
    }

    /// Create a last-value quote with a daily change.
    pub fn last(
        asset_class: AssetClass,
        symbol: &str,
        last: Decimal,
        change_percent: Decimal,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(asset_class, symbol, None, last)?.with_change(change_percent))
    }

    /// Attach a daily change percentage.
    pub fn with_change(mut self, change_percent: Decimal) -> Self {
        self.change_percent = Some(change_percent);
        self
    }

    /// Price used for alert evaluation and display.
    pub fn price(&self) -> Decimal {
        self.ask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_two_sided_quote() {
        let quote = AssetQuote::two_sided(AssetClass::Currency, "usd", dec!(40.10), dec!(40.50))
            .unwrap();
        assert_eq!(quote.symbol, "USD");
        assert_eq!(quote.price(), dec!(40.50));
        assert_eq!(quote.bid, Some(dec!(40.10)));
    }

    #[test]
    fn test_rejects_non_positive_ask() {
        let result = AssetQuote::new(AssetClass::Metal, "gram", None, Decimal::ZERO);
        assert_eq!(result, Err(ValidationError::NonPositivePrice(Decimal::ZERO)));
    }

    #[test]
    fn test_rejects_crossed_quote() {
        let result = AssetQuote::two_sided(AssetClass::Currency, "EUR", dec!(45), dec!(44));
        assert!(matches!(result, Err(ValidationError::CrossedQuote { .. })));
    }

    #[test]
    fn test_last_quote_has_change() {
        let quote = AssetQuote::last(AssetClass::Equity, "THYAO.IS", dec!(312.5), dec!(-1.2))
            .unwrap();
        assert_eq!(quote.symbol, "THYAO");
        assert_eq!(quote.bid, None);
        assert_eq!(quote.change_percent, Some(dec!(-1.2)));
    }
}
