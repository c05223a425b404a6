//! Asset class definitions.

use crate::error::ValidationError;
use crate::text::fold_turkish;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Asset class of a tracked instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Currency pairs quoted against TRY
    Currency,
    /// Gold products (gram, quarter, full coin, ounce)
    Metal,
    /// Borsa Istanbul equities and the BIST 100 index
    Equity,
}

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP"];
const METALS: &[&str] = &["gram", "ceyrek", "yarim", "tam", "cumhuriyet", "ons"];
const EQUITIES: &[&str] = &[
    "XU100", "THYAO", "GARAN", "AKBNK", "EREGL", "SAHOL", "TUPRS", "PETKM", "SISE",
];

impl AssetClass {
    /// Get all asset classes.
    pub fn all() -> &'static [AssetClass] {
        &[AssetClass::Currency, AssetClass::Metal, AssetClass::Equity]
    }

    /// Symbols the built-in sources know how to extract, in display order.
    pub fn tracked_symbols(&self) -> &'static [&'static str] {
        match self {
            AssetClass::Currency => CURRENCIES,
            AssetClass::Metal => METALS,
            AssetClass::Equity => EQUITIES,
        }
    }

    /// Bring a user- or source-supplied symbol into the canonical key form.
    ///
    /// Currency codes are upper-cased, metal keys are lower-cased with Turkish
    /// letters folded and spaces removed, equity tickers are upper-cased with
    /// any exchange suffix (`THYAO.IS`) removed.
    pub fn normalize_symbol(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            AssetClass::Currency => trimmed.to_ascii_uppercase(),
            AssetClass::Metal => {
                let folded = fold_turkish(trimmed);
                let key: String = folded.chars().filter(|c| !c.is_whitespace()).collect();
                ["altini", "altin"]
                    .iter()
                    .find_map(|suffix| key.strip_suffix(suffix).filter(|stem| !stem.is_empty()))
                    .map(str::to_string)
                    .unwrap_or(key)
            }
            AssetClass::Equity => {
                let upper = trimmed.to_ascii_uppercase();
                match upper.split_once('.') {
                    Some((ticker, _suffix)) => ticker.to_string(),
                    None => upper,
                }
            }
        }
    }

    /// Section title used in reports.
    pub fn title(&self) -> &'static str {
        match self {
            AssetClass::Currency => "Currencies",
            AssetClass::Metal => "Gold",
            AssetClass::Equity => "Borsa Istanbul",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetClass::Currency => "currency",
            AssetClass::Metal => "metal",
            AssetClass::Equity => "equity",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AssetClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_turkish(s.trim()).as_str() {
            "currency" | "fx" | "doviz" => Ok(AssetClass::Currency),
            "metal" | "gold" | "altin" => Ok(AssetClass::Metal),
            "equity" | "stock" | "hisse" | "borsa" => Ok(AssetClass::Equity),
            _ => Err(ValidationError::UnknownAssetClass(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_currency() {
        assert_eq!(AssetClass::Currency.normalize_symbol(" usd "), "USD");
    }

    #[test]
    fn test_normalize_metal() {
        assert_eq!(AssetClass::Metal.normalize_symbol("Çeyrek"), "ceyrek");
        assert_eq!(AssetClass::Metal.normalize_symbol("Gram Altın"), "gram");
        assert_eq!(AssetClass::Metal.normalize_symbol("ons"), "ons");
    }

    #[test]
    fn test_normalize_equity() {
        assert_eq!(AssetClass::Equity.normalize_symbol("thyao.is"), "THYAO");
        assert_eq!(AssetClass::Equity.normalize_symbol("XU100"), "XU100");
    }

    #[test]
    fn test_asset_class_parse() {
        assert_eq!(AssetClass::from_str("doviz").unwrap(), AssetClass::Currency);
        assert_eq!(AssetClass::from_str("Altın").unwrap(), AssetClass::Metal);
        assert_eq!(AssetClass::from_str("equity").unwrap(), AssetClass::Equity);
        assert!(AssetClass::from_str("crypto").is_err());
    }

    #[test]
    fn test_asset_class_display() {
        assert_eq!(AssetClass::Metal.to_string(), "metal");
    }
}
