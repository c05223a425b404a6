//! JSON API parsers.

use super::{decimal_text, insert_last, insert_two_sided, QuoteParser};
use finalert_core::{AssetClass, QuoteMap};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Read a number or numeric string as a decimal.
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(text) => decimal_text(text),
        _ => None,
    }
}

fn parse_root(body: &str) -> Result<Value, String> {
    serde_json::from_str(body).map_err(|e| format!("invalid JSON: {}", e))
}

/// Field names inside each keyed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPair {
    TwoSided { bid: String, ask: String },
    Last { value: String, change: Option<String> },
}

impl FieldPair {
    pub fn two_sided(bid: impl Into<String>, ask: impl Into<String>) -> Self {
        FieldPair::TwoSided {
            bid: bid.into(),
            ask: ask.into(),
        }
    }

    pub fn last(value: impl Into<String>, change: impl Into<String>) -> Self {
        FieldPair::Last {
            value: value.into(),
            change: Some(change.into()),
        }
    }
}

/// A top-level object keyed by upstream code, e.g.
/// `{"USD": {"buying": 40.1, "selling": 40.4}}`.
#[derive(Debug, Clone)]
pub struct KeyedJson {
    codes: Vec<(String, String)>,
    fields: FieldPair,
}

impl KeyedJson {
    /// Create a parser reading each `(code, symbol)` pair with `fields`.
    pub fn new<K, S>(codes: impl IntoIterator<Item = (K, S)>, fields: FieldPair) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|(code, symbol)| (code.into(), symbol.into()))
                .collect(),
            fields,
        }
    }
}

impl QuoteParser for KeyedJson {
    fn parse(&self, asset_class: AssetClass, body: &str) -> Result<QuoteMap, String> {
        let root = parse_root(body)?;
        let object = root
            .as_object()
            .ok_or_else(|| "expected a JSON object at the top level".to_string())?;

        let mut quotes = QuoteMap::new();
        for (code, symbol) in &self.codes {
            let Some(entry) = object.get(code) else {
                continue;
            };
            match &self.fields {
                FieldPair::TwoSided { bid, ask } => insert_two_sided(
                    &mut quotes,
                    asset_class,
                    symbol,
                    entry.get(bid).and_then(json_decimal),
                    entry.get(ask).and_then(json_decimal),
                ),
                FieldPair::Last { value, change } => insert_last(
                    &mut quotes,
                    asset_class,
                    symbol,
                    entry.get(value).and_then(json_decimal),
                    change
                        .as_ref()
                        .and_then(|field| entry.get(field))
                        .and_then(json_decimal),
                ),
            }
        }

        Ok(quotes)
    }
}

/// CollectAPI gold price payload: `{"result": [{"name", "buying", "selling"}]}`.
#[derive(Debug, Clone)]
pub struct CollectApiJson {
    classify: fn(&str) -> Option<&'static str>,
}

impl CollectApiJson {
    pub fn new(classify: fn(&str) -> Option<&'static str>) -> Self {
        Self { classify }
    }
}

impl QuoteParser for CollectApiJson {
    fn parse(&self, asset_class: AssetClass, body: &str) -> Result<QuoteMap, String> {
        let root = parse_root(body)?;
        let rows = root
            .get("result")
            .and_then(Value::as_array)
            .ok_or_else(|| "missing result array".to_string())?;

        let mut quotes = QuoteMap::new();
        for row in rows {
            let Some(symbol) = row.get("name").and_then(Value::as_str).and_then(self.classify)
            else {
                continue;
            };
            insert_two_sided(
                &mut quotes,
                asset_class,
                symbol,
                row.get("buying").and_then(json_decimal),
                row.get("selling").and_then(json_decimal),
            );
        }

        Ok(quotes)
    }
}
