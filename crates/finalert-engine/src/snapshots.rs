//! Per-cycle snapshot collection.

use finalert_core::{AssetClass, MarketData, Snapshot};
use futures::future::join_all;
use std::time::Duration;
use tracing::warn;

/// Time one asset class may take before its snapshot is given up on.
pub(crate) const DEFAULT_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(60);

/// Provenance label of a snapshot that missed its time limit.
pub(crate) const TIMED_OUT: &str = "timeout";

/// Fetch every asset class concurrently, each under its own time limit.
///
/// A class that runs out of time comes back as an empty snapshot, so the
/// classes that did answer are still evaluated this cycle.
pub(crate) async fn collect_snapshots<C>(
    market: &dyn MarketData,
    asset_classes: impl IntoIterator<Item = AssetClass>,
    limit: Duration,
) -> C
where
    C: FromIterator<(AssetClass, Snapshot)>,
{
    let fetches = asset_classes.into_iter().map(|asset_class| async move {
        let snapshot = match tokio::time::timeout(limit, market.snapshot(asset_class)).await {
            Ok(snapshot) => {
                if snapshot.provenance.is_degraded() {
                    warn!(
                        asset_class = %asset_class,
                        provenance = %snapshot.provenance,
                        quotes = snapshot.len(),
                        "Primary sources unavailable"
                    );
                }
                snapshot
            }
            Err(_) => {
                warn!(
                    asset_class = %asset_class,
                    limit_secs = limit.as_secs(),
                    "Snapshot timed out, asset class skipped this cycle"
                );
                Snapshot::unavailable(asset_class, TIMED_OUT)
            }
        };
        (asset_class, snapshot)
    });
    join_all(fetches).await.into_iter().collect()
}
