//! Ordered source fallback for one asset class.

use finalert_core::{AssetClass, FetchError, Fetcher, Provenance, QuoteMap, Snapshot};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ordered fetchers plus one designated last-resort fetcher.
///
/// Fetchers are tried strictly in order and the first non-empty result wins;
/// later fetchers are not invoked. The last-resort fetcher runs only when
/// every ordered fetcher failed or came back empty. A chain never returns an
/// error: total failure yields an empty snapshot.
///
/// Each fetch is cut off at the fetcher's own time limit, so a stalled
/// source costs the chain at most that long.
pub struct SourceChain {
    asset_class: AssetClass,
    fetchers: Vec<Arc<dyn Fetcher>>,
    last_resort: Arc<dyn Fetcher>,
}

impl SourceChain {
    pub fn new(
        asset_class: AssetClass,
        fetchers: Vec<Arc<dyn Fetcher>>,
        last_resort: Arc<dyn Fetcher>,
    ) -> Self {
        let fetchers = fetchers
            .into_iter()
            .filter(|fetcher| {
                let matches = fetcher.asset_class() == asset_class;
                if !matches {
                    warn!(
                        asset_class = %asset_class,
                        source = fetcher.source(),
                        serves = %fetcher.asset_class(),
                        "Dropping source serving another asset class"
                    );
                }
                matches
            })
            .collect();
        Self {
            asset_class,
            fetchers,
            last_resort,
        }
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    /// Source labels in the order they are tried, last resort included.
    pub fn sources(&self) -> Vec<&str> {
        self.fetchers
            .iter()
            .map(|f| f.source())
            .chain(std::iter::once(self.last_resort.source()))
            .collect()
    }

    /// Run the chain and return the first usable snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        for fetcher in &self.fetchers {
            match attempt(fetcher.as_ref()).await {
                Ok(quotes) if !quotes.is_empty() => {
                    debug!(
                        asset_class = %self.asset_class,
                        source = fetcher.source(),
                        quotes = quotes.len(),
                        "Source answered"
                    );
                    return Snapshot::new(
                        self.asset_class,
                        quotes,
                        Provenance::Live(fetcher.source().to_string()),
                    );
                }
                Ok(_) => {
                    debug!(asset_class = %self.asset_class, source = fetcher.source(), "Source returned no quotes");
                }
                Err(e) => {
                    warn!(asset_class = %self.asset_class, source = fetcher.source(), error = %e, "Source failed");
                }
            }
        }

        let fallback = self.last_resort.source();
        warn!(asset_class = %self.asset_class, fallback, "All sources failed, using last resort");

        match attempt(self.last_resort.as_ref()).await {
            Ok(quotes) if !quotes.is_empty() => {
                info!(asset_class = %self.asset_class, fallback, quotes = quotes.len(), "Last resort answered");
                Snapshot::new(
                    self.asset_class,
                    quotes,
                    Provenance::LastResort(fallback.to_string()),
                )
            }
            Ok(_) => {
                warn!(asset_class = %self.asset_class, fallback, "Last resort returned no quotes");
                Snapshot::unavailable(self.asset_class, fallback)
            }
            Err(e) => {
                warn!(asset_class = %self.asset_class, fallback, error = %e, "Last resort failed");
                Snapshot::unavailable(self.asset_class, fallback)
            }
        }
    }
}

async fn attempt(fetcher: &dyn Fetcher) -> Result<QuoteMap, FetchError> {
    let Some(limit) = fetcher.time_limit() else {
        return fetcher.fetch().await;
    };
    match tokio::time::timeout(limit, fetcher.fetch()).await {
        Ok(outcome) => outcome,
        Err(_) => Err(FetchError::Timeout {
            origin: fetcher.source().to_string(),
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Script, ScriptedFetcher};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn scripted(label: &'static str, script: Script) -> Arc<ScriptedFetcher> {
        Arc::new(ScriptedFetcher::new(label, AssetClass::Currency, script))
    }

    #[tokio::test]
    async fn test_first_non_empty_wins() {
        let a = scripted("a", Script::Empty);
        let b = scripted("b", Script::Quotes(vec![("USD", dec!(40.5))]));
        let c = scripted("c", Script::Quotes(vec![("USD", dec!(41))]));
        let fallback = scripted("z", Script::Quotes(vec![("USD", dec!(42))]));

        let chain = SourceChain::new(
            AssetClass::Currency,
            vec![a.clone(), b.clone(), c.clone()],
            fallback.clone(),
        );
        let snapshot = chain.snapshot().await;

        assert_eq!(snapshot.provenance, Provenance::Live("b".to_string()));
        assert_eq!(snapshot.price("USD"), Some(dec!(40.5)));
        assert_eq!((a.calls(), b.calls(), c.calls(), fallback.calls()), (1, 1, 0, 0));
    }

    #[tokio::test]
    async fn test_last_resort_after_failures() {
        let a = scripted("a", Script::Fail);
        let b = scripted("b", Script::Empty);
        let fallback = scripted("tcmb", Script::Quotes(vec![("USD", dec!(40.2))]));

        let chain = SourceChain::new(AssetClass::Currency, vec![a, b], fallback.clone());
        let snapshot = chain.snapshot().await;

        assert_eq!(snapshot.provenance, Provenance::LastResort("tcmb".to_string()));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_is_empty_snapshot() {
        let chain = SourceChain::new(
            AssetClass::Currency,
            vec![scripted("a", Script::Fail)],
            scripted("tcmb", Script::Fail),
        );
        let snapshot = chain.snapshot().await;

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.provenance, Provenance::Unavailable("tcmb".to_string()));
    }

    #[tokio::test]
    async fn test_sources_listing() {
        let chain = SourceChain::new(
            AssetClass::Currency,
            vec![scripted("sabah", Script::Empty), scripted("mynet", Script::Empty)],
            scripted("tcmb", Script::Empty),
        );
        assert_eq!(chain.sources(), vec!["sabah", "mynet", "tcmb"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_source_is_cut_off() {
        let stalled = Arc::new(
            ScriptedFetcher::new("yahoo", AssetClass::Currency, Script::Stall)
                .with_time_limit(Duration::from_secs(12)),
        );
        let next = scripted("genelpara", Script::Quotes(vec![("USD", dec!(40.5))]));
        let chain = SourceChain::new(
            AssetClass::Currency,
            vec![stalled.clone(), next],
            scripted("tcmb", Script::Fail),
        );

        let started = tokio::time::Instant::now();
        let snapshot = chain.snapshot().await;

        assert_eq!(snapshot.provenance, Provenance::Live("genelpara".to_string()));
        assert_eq!(started.elapsed(), Duration::from_secs(12));
        assert_eq!(stalled.calls(), 1);
    }

    #[tokio::test]
    async fn test_foreign_asset_class_source_is_dropped() {
        let gold = Arc::new(ScriptedFetcher::new(
            "mynet",
            AssetClass::Metal,
            Script::Quotes(vec![("gram", dec!(3246.8))]),
        ));
        let chain = SourceChain::new(
            AssetClass::Currency,
            vec![gold.clone(), scripted("sabah", Script::Empty)],
            scripted("tcmb", Script::Empty),
        );

        assert_eq!(chain.sources(), vec!["sabah", "tcmb"]);
        chain.snapshot().await;
        assert_eq!(gold.calls(), 0);
    }
}
