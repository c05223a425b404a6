//! Yahoo Finance chart API, one request per ticker.

use super::merge_per_symbol;
use crate::source::SourceSpec;
use crate::transport::Transport;
use async_trait::async_trait;
use finalert_core::{AssetClass, AssetQuote, FetchError, Fetcher, QuoteMap};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<Decimal>,
    chart_previous_close: Option<Decimal>,
    previous_close: Option<Decimal>,
}

/// Fetches last price and daily change for Borsa Istanbul tickers.
pub struct YahooChartFetcher {
    spec: SourceSpec,
    transport: Arc<dyn Transport>,
    tickers: Vec<String>,
}

impl YahooChartFetcher {
    /// `spec.url` must contain a `{symbol}` placeholder. Tickers are given
    /// without the exchange suffix.
    pub fn new<S: Into<String>>(
        spec: SourceSpec,
        transport: Arc<dyn Transport>,
        tickers: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            spec,
            transport,
            tickers: tickers.into_iter().map(Into::into).collect(),
        }
    }

    async fn fetch_ticker(&self, ticker: &str) -> Result<QuoteMap, FetchError> {
        let url = self.spec.url_for(&format!("{}.IS", ticker));
        let body = self.spec.get_text(self.transport.as_ref(), &url).await?;
        let response: ChartResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::parse(&self.spec.label, format!("invalid chart JSON: {}", e)))?;

        let mut quotes = QuoteMap::new();
        let Some(meta) = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|result| result.meta)
        else {
            return Ok(quotes);
        };
        let Some(price) = meta.regular_market_price else {
            return Ok(quotes);
        };

        let change = match meta.chart_previous_close.or(meta.previous_close) {
            Some(previous) if previous > Decimal::ZERO => {
                ((price - previous) / previous * Decimal::ONE_HUNDRED).round_dp(2)
            }
            _ => Decimal::ZERO,
        };
        if let Ok(quote) = AssetQuote::last(self.spec.asset_class, ticker, price, change) {
            quotes.insert(quote.symbol.clone(), quote);
        }
        Ok(quotes)
    }
}

#[async_trait]
impl Fetcher for YahooChartFetcher {
    async fn fetch(&self) -> Result<QuoteMap, FetchError> {
        let outcomes = join_all(self.tickers.iter().map(|ticker| async move {
            (ticker.clone(), self.fetch_ticker(ticker).await)
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
