//! Per-currency exchange rate API.

use super::merge_per_symbol;
use crate::parse::json_decimal;
use crate::source::SourceSpec;
use crate::transport::Transport;
use async_trait::async_trait;
use finalert_core::{AssetClass, AssetQuote, FetchError, Fetcher, QuoteMap};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Half-spread applied around the mid rate, since the API only publishes one.
const HALF_SPREAD: Decimal = dec!(0.002);

/// Fetches `{base: code}` rates one currency at a time and reads the TRY
/// rate as the mid price.
pub struct RateApiFetcher {
    spec: SourceSpec,
    transport: Arc<dyn Transport>,
    codes: Vec<String>,
}

impl RateApiFetcher {
    /// `spec.url` must contain a `{symbol}` placeholder for the base code.
    pub fn new<S: Into<String>>(
        spec: SourceSpec,
        transport: Arc<dyn Transport>,
        codes: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            spec,
            transport,
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    async fn fetch_code(&self, code: &str) -> Result<QuoteMap, FetchError> {
        let body = self
            .spec
            .get_text(self.transport.as_ref(), &self.spec.url_for(code))
            .await?;
        let root: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::parse(&self.spec.label, format!("invalid JSON: {}", e)))?;
        let rates = root
            .get("rates")
            .and_then(Value::as_object)
            .ok_or_else(|| FetchError::parse(&self.spec.label, "missing rates object"))?;

        let mut quotes = QuoteMap::new();
        if let Some(mid) = rates.get("TRY").and_then(json_decimal) {
            let bid = (mid * (Decimal::ONE - HALF_SPREAD)).round_dp(4);
            let ask = (mid * (Decimal::ONE + HALF_SPREAD)).round_dp(4);
            if let Ok(quote) = AssetQuote::two_sided(self.spec.asset_class, code, bid, ask) {
                quotes.insert(quote.symbol.clone(), quote);
            }
        }
        Ok(quotes)
    }
}

#[async_trait]
impl Fetcher for RateApiFetcher {
    async fn fetch(&self) -> Result<QuoteMap, FetchError> {
        let outcomes = join_all(self.codes.iter().map(|code| async move {
            (code.clone(), self.fetch_code(code).await)
        }))
        .await;
        merge_per_symbol(&self.spec.label, outcomes)
    }

    fn source(&self) -> &str {
        &self.spec.label
    }

    fn asset_class(&self) -> AssetClass {
        self.spec.asset_class
    }

    fn time_limit(&self) -> Option<Duration> {
        // Requests run concurrently, so one fetch costs about one request.
        Some(self.spec.time_limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Jitter;
    use crate::testing::CannedTransport;
    use crate::transport::HttpResponse;

    fn fetcher(transport: CannedTransport) -> RateApiFetcher {
        let spec = SourceSpec::new(
            "exchangerate-api",
            AssetClass::Currency,
            "https://rates.example/latest/{symbol}",
        )
        .with_jitter(Jitter::none());
        RateApiFetcher::new(spec, Arc::new(transport), ["USD", "EUR"])
    }

    #[tokio::test]
    async fn test_spread_around_mid() {
        let transport = CannedTransport::new()
            .with_response(
                "https://rates.example/latest/USD",
                HttpResponse::ok(r#"{"base": "USD", "rates": {"TRY": 40.0, "EUR": 0.86}}"#),
            )
            .with_response(
                "https://rates.example/latest/EUR",
                HttpResponse::ok(r#"{"base": "EUR", "rates": {"TRY": 47.0}}"#),
            );
        let quotes = fetcher(transport).fetch().await.unwrap();

        assert_eq!(quotes["USD"].bid, Some(dec!(39.92)));
        assert_eq!(quotes["USD"].ask, dec!(40.08));
        assert_eq!(quotes["EUR"].ask, dec!(47.094));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_answers() {
        let transport = CannedTransport::new().with_response(
            "https://rates.example/latest/USD",
            HttpResponse::ok(r#"{"rates": {"TRY": 40.0}}"#),
        );
        let quotes = fetcher(transport).fetch().await.unwrap();
        assert_eq!(quotes.len(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_is_error() {
        let err = fetcher(CannedTransport::new()).fetch().await.unwrap_err();
        assert_eq!(err.origin(), "exchangerate-api");
    }
}
