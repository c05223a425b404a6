//! Single-request page or API fetcher.

use crate::parse::QuoteParser;
use crate::source::SourceSpec;
use crate::transport::Transport;
use async_trait::async_trait;
use finalert_core::{AssetClass, FetchError, Fetcher, QuoteMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Fetches one URL and hands the body to a parser.
pub struct PageFetcher {
    spec: SourceSpec,
    transport: Arc<dyn Transport>,
    parser: Box<dyn QuoteParser>,
}

impl PageFetcher {
    pub fn new(
        spec: SourceSpec,
        transport: Arc<dyn Transport>,
        parser: impl QuoteParser + 'static,
    ) -> Self {
        Self {
            spec,
            transport,
            parser: Box::new(parser),
        }
    }
}

#[async_trait]
impl Fetcher for PageFetcher {
    async fn fetch(&self) -> Result<QuoteMap, FetchError> {
        let started = Instant::now();
        let body = self
            .spec
            .get_text(self.transport.as_ref(), &self.spec.url)
            .await?;

        let quotes = self
            .parser
            .parse(self.spec.asset_class, &body)
            .map_err(|message| FetchError::parse(&self.spec.label, message))?;

        debug!(
            source = %self.spec.label,
            quotes = quotes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(quotes)
    }

    fn source(&self) -> &str {
        &self.spec.label
    }

    fn asset_class(&self) -> AssetClass {
        self.spec.asset_class
    }

    fn time_limit(&self) -> Option<Duration> {
        Some(self.spec.time_limit())
    }
}
