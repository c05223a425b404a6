//! Market data trait definition.

use crate::types::{AssetClass, Snapshot};
use async_trait::async_trait;

/// Uniform access to current snapshots, one asset class at a time.
///
/// Never fails: when every source is down the snapshot is empty and its
/// provenance says so.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Get the current snapshot of an asset class.
    async fn snapshot(&self, asset_class: AssetClass) -> Snapshot;
}
