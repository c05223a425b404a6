//! Market data facade over the three source chains.

use crate::chain::SourceChain;
use async_trait::async_trait;
use chrono::Utc;
use finalert_core::{AssetClass, MarketData, Snapshot};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

struct ChainSlot {
    chain: SourceChain,
    in_flight: Mutex<()>,
    cached: RwLock<Option<Snapshot>>,
}

impl ChainSlot {
    fn new(chain: SourceChain) -> Self {
        Self {
            chain,
            in_flight: Mutex::new(()),
            cached: RwLock::new(None),
        }
    }
}

/// Serves snapshots per asset class, optionally reusing recent ones.
///
/// With a zero TTL every call runs the chain. Concurrent calls for the same
/// asset class are serialized, so with a TTL only the first caller fetches.
/// Empty snapshots are never cached.
pub struct MarketDataCache {
    currency: ChainSlot,
    metal: ChainSlot,
    equity: ChainSlot,
    ttl: Duration,
}

impl MarketDataCache {
    pub fn new(currency: SourceChain, metal: SourceChain, equity: SourceChain) -> Self {
        Self {
            currency: ChainSlot::new(currency),
            metal: ChainSlot::new(metal),
            equity: ChainSlot::new(equity),
            ttl: Duration::ZERO,
        }
    }

    /// Reuse snapshots younger than `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn slot(&self, asset_class: AssetClass) -> &ChainSlot {
        match asset_class {
            AssetClass::Currency => &self.currency,
            AssetClass::Metal => &self.metal,
            AssetClass::Equity => &self.equity,
        }
    }

    /// Get the chain serving an asset class.
    pub fn chain(&self, asset_class: AssetClass) -> &SourceChain {
        &self.slot(asset_class).chain
    }

    /// Get a snapshot for one asset class.
    pub async fn get(&self, asset_class: AssetClass) -> Snapshot {
        let slot = self.slot(asset_class);
        if self.ttl.is_zero() {
            return slot.chain.snapshot().await;
        }

        let _guard = slot.in_flight.lock().await;
        if let Some(snapshot) = slot.cached.read().await.as_ref() {
            let fresh = snapshot
                .age(Utc::now())
                .to_std()
                .map(|age| age < self.ttl)
                .unwrap_or(false);
            if fresh {
                debug!(asset_class = %asset_class, source = snapshot.source(), "Serving cached snapshot");
                return snapshot.clone();
            }
        }

        let snapshot = slot.chain.snapshot().await;
        if !snapshot.is_empty() {
            *slot.cached.write().await = Some(snapshot.clone());
        }
        snapshot
    }

    /// Currency snapshot.
    pub async fn currency(&self) -> Snapshot {
        self.get(AssetClass::Currency).await
    }

    /// Gold snapshot.
    pub async fn metals(&self) -> Snapshot {
        self.get(AssetClass::Metal).await
    }

    /// Equity snapshot.
    pub async fn equities(&self) -> Snapshot {
        self.get(AssetClass::Equity).await
    }
}

#[async_trait]
impl MarketData for MarketDataCache {
    async fn snapshot(&self, asset_class: AssetClass) -> Snapshot {
        self.get(asset_class).await
    }
}
