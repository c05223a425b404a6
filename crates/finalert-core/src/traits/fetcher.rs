//! Fetcher trait definition.

use crate::error::FetchError;
use crate::types::{AssetClass, QuoteMap};
use async_trait::async_trait;
use std::time::Duration;

/// A single upstream source for one asset class.
///
/// A fetcher performs one logical request against its source and parses the
/// payload into normalized quotes. The map may hold only a subset of the
/// tracked symbols; a partial answer is still a success.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the current quotes.
    ///
    /// # Returns
    /// The quotes the source published, possibly empty. Network failures,
    /// timeouts, non-2xx responses, and unparseable payloads are all
    /// reported as `FetchError`.
    async fn fetch(&self) -> Result<QuoteMap, FetchError>;

    /// Label of the upstream source, used as snapshot provenance.
    fn source(&self) -> &str;

    /// Asset class this fetcher produces.
    fn asset_class(&self) -> AssetClass;

    /// Upper bound on one `fetch` call, request delays included.
    ///
    /// `None` means the fetcher is trusted to bound itself.
    fn time_limit(&self) -> Option<Duration> {
        None
    }
}
