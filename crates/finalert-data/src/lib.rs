//! Market data acquisition for finalert.
//!
//! Each asset class is served by a [`SourceChain`]: an ordered list of
//! fetchers scraping public pages and APIs, plus one last-resort fetcher.
//! [`MarketDataCache`] puts the three chains behind the
//! [`MarketData`](finalert_core::MarketData) trait.

mod cache;
mod chain;
pub mod classify;
pub mod fetchers;
pub mod parse;
mod registry;
mod source;
mod transport;

#[cfg(test)]
mod testing;

pub use cache::MarketDataCache;
pub use chain::SourceChain;
pub use registry::{
    builtin_source, ChainSpec, RegistryError, RequestDefaults, SourceInfo, SourceRegistry,
    SourceTuning,
};
pub use source::{Jitter, SourceSpec, DEFAULT_USER_AGENTS};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use finalert_core::AssetClass;

/// Build the production market data facade with the reqwest transport.
pub fn build_market_data(
    chains: &BTreeMap<AssetClass, ChainSpec>,
    defaults: RequestDefaults,
    ttl: Duration,
) -> Result<MarketDataCache, RegistryError> {
    SourceRegistry::new(Arc::new(ReqwestTransport::new()))
        .with_defaults(defaults)
        .build_market_data(chains, ttl)
}
