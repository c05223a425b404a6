//! Recurring market report delivery.

use crate::report::format_report;
use crate::runner::{Cycle, CycleStats};
use crate::snapshots::{collect_snapshots, DEFAULT_SNAPSHOT_TIMEOUT};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finalert_core::{
    AssetClass, MarketData, Messenger, PersistenceError, RecurringNotification, Snapshot, Store,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Sends market reports to subscribers whose interval has elapsed.
///
/// `last_sent_at` is written before the report goes out, so a failed send
/// costs the subscriber that one report and never causes a resend burst.
pub struct NotificationScheduler {
    market: Arc<dyn MarketData>,
    store: Arc<dyn Store>,
    messenger: Arc<dyn Messenger>,
    snapshot_timeout: Duration,
    running: Mutex<()>,
}

impl NotificationScheduler {
    pub fn new(
        market: Arc<dyn MarketData>,
        store: Arc<dyn Store>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            market,
            store,
            messenger,
            snapshot_timeout: DEFAULT_SNAPSHOT_TIMEOUT,
            running: Mutex::new(()),
        }
    }

    /// Give up on an asset class whose snapshot takes longer than `timeout`.
    pub fn with_snapshot_timeout(mut self, timeout: Duration) -> Self {
        self.snapshot_timeout = timeout;
        self
    }

    /// Run one scheduling cycle at the current time.
    pub async fn run_cycle(&self) -> Option<CycleStats> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one scheduling cycle as if the clock read `now`.
    ///
    /// # Returns
    /// Cycle statistics, or `None` if the previous cycle is still running.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Option<CycleStats> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Previous notification cycle still running, skipping");
            return None;
        };

        let mut stats = CycleStats::default();
        let notifications = match self.store.active_notifications().await {
            Ok(notifications) => notifications,
            Err(e) => {
                error!(error = %e, "Failed to load active notifications");
                stats.failed += 1;
                return Some(stats);
            }
        };
        stats.considered = notifications.len();

        let due: Vec<RecurringNotification> =
            notifications.into_iter().filter(|n| n.is_due(now)).collect();
        if due.is_empty() {
            debug!(considered = stats.considered, "No notifications due");
            return Some(stats);
        }

        // Each class is fetched once and shared by every due notification.
        let classes: BTreeSet<AssetClass> = due
            .iter()
            .flat_map(|n| n.asset_classes.iter().copied())
            .collect();
        let snapshots: BTreeMap<AssetClass, Snapshot> =
            collect_snapshots(self.market.as_ref(), classes, self.snapshot_timeout).await;

        for notification in &due {
            match self.deliver(notification, &snapshots, now).await {
                Ok(Some(delivered)) => {
                    stats.fired += 1;
                    if delivered {
                        stats.delivered += 1;
                    }
                }
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    error!(notification_id = %notification.id, error = %e, "Failed to process notification");
                    stats.failed += 1;
                }
            }
        }

        info!(
            considered = stats.considered,
            sent = stats.fired,
            delivered = stats.delivered,
            skipped = stats.skipped,
            failed = stats.failed,
            "Notification cycle complete"
        );
        Some(stats)
    }

    /// Returns `None` when the owner is gone, otherwise whether delivery succeeded.
    async fn deliver(
        &self,
        notification: &RecurringNotification,
        snapshots: &BTreeMap<AssetClass, Snapshot>,
        now: DateTime<Utc>,
    ) -> Result<Option<bool>, PersistenceError> {
        let Some(user) = self.store.user_by_id(notification.user_id).await? else {
            warn!(notification_id = %notification.id, user_id = %notification.user_id, "Owner not found");
            return Ok(None);
        };

        self.store.mark_sent(notification.id, now).await?;

        let selected: BTreeMap<AssetClass, Snapshot> = notification
            .asset_classes
            .iter()
            .filter_map(|class| snapshots.get(class).map(|s| (*class, s.clone())))
            .collect();
        let report = format_report(&selected, now);

        match self.messenger.send(user.chat_id, &report).await {
            Ok(()) => {
                info!(
                    notification_id = %notification.id,
                    chat_id = user.chat_id,
                    interval = %notification.interval,
                    "Report delivered"
                );
                Ok(Some(true))
            }
            Err(e) => {
                warn!(notification_id = %notification.id, chat_id = user.chat_id, error = %e, "Report delivery failed");
                Ok(Some(false))
            }
        }
    }
}

#[async_trait]
impl Cycle for NotificationScheduler {
    fn name(&self) -> &str {
        "notifications"
    }

    async fn run_cycle(&self) -> Option<CycleStats> {
        NotificationScheduler::run_cycle(self).await
    }
}
