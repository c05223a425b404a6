//! Fetcher implementations.

mod page;
mod rate_api;
mod yahoo;

pub use page::PageFetcher;
pub use rate_api::RateApiFetcher;
pub use yahoo::YahooChartFetcher;

use finalert_core::{FetchError, QuoteMap};
use tracing::debug;

/// Merge per-symbol request outcomes.
///
/// Individual failures are tolerated as long as at least one request got an
/// answer. When every request failed, the last error is returned so the
/// chain moves on to the next source.
fn merge_per_symbol(
    source: &str,
    outcomes: Vec<(String, Result<QuoteMap, FetchError>)>,
) -> Result<QuoteMap, FetchError> {
    let mut quotes = QuoteMap::new();
    let mut answered = false;
    let mut last_error = None;

    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(partial) => {
                answered = true;
                quotes.extend(partial);
            }
            Err(e) => {
                debug!(source, symbol = %symbol, error = %e, "Per-symbol request failed");
                last_error = Some(e);
            }
        }
    }

    match (answered, last_error) {
        (false, Some(error)) => Err(error),
        _ => Ok(quotes),
    }
}
