//! Threshold alert evaluation.

use crate::report::format_alert_message;
use crate::runner::{Cycle, CycleStats};
use crate::snapshots::{collect_snapshots, DEFAULT_SNAPSHOT_TIMEOUT};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finalert_core::{
    Alert, AssetClass, MarketData, Messenger, PersistenceError, Snapshot, Store,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

enum Outcome {
    NoData,
    NotMet,
    Fired { delivered: bool },
}

/// Matches active alerts against current prices and fires each at most once.
pub struct AlertEvaluator {
    market: Arc<dyn MarketData>,
    store: Arc<dyn Store>,
    messenger: Arc<dyn Messenger>,
    snapshot_timeout: Duration,
    running: Mutex<()>,
}

impl AlertEvaluator {
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

    /// Run one evaluation cycle.
    ///
    /// # Returns
    /// Cycle statistics, or `None` if the previous cycle is still running.
    pub async fn run_cycle(&self) -> Option<CycleStats> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Previous alert cycle still running, skipping");
            return None;
        };

        let mut stats = CycleStats::default();
        let alerts = match self.store.active_alerts().await {
            Ok(alerts) => alerts,
            Err(e) => {
                error!(error = %e, "Failed to load active alerts");
                stats.failed += 1;
                return Some(stats);
            }
        };
        if alerts.is_empty() {
            debug!("No active alerts");
            return Some(stats);
        }

        let classes: BTreeSet<AssetClass> = alerts.iter().map(|a| a.asset_class).collect();
        let snapshots: HashMap<AssetClass, Snapshot> =
            collect_snapshots(self.market.as_ref(), classes, self.snapshot_timeout).await;

        let now = Utc::now();
        for alert in &alerts {
            stats.considered += 1;
            match self.evaluate(alert, &snapshots, now).await {
                Ok(Outcome::NoData) => stats.skipped += 1,
                Ok(Outcome::NotMet) => {}
                Ok(Outcome::Fired { delivered }) => {
                    stats.fired += 1;
                    if delivered {
                        stats.delivered += 1;
                    }
                }
                Err(e) => {
                    error!(alert_id = %alert.id, error = %e, "Failed to process alert");
                    stats.failed += 1;
                }
            }
        }

        info!(
            considered = stats.considered,
            fired = stats.fired,
            delivered = stats.delivered,
            skipped = stats.skipped,
            failed = stats.failed,
            "Alert cycle complete"
        );
        Some(stats)
    }

    async fn evaluate(
        &self,
        alert: &Alert,
        snapshots: &HashMap<AssetClass, Snapshot>,
        now: DateTime<Utc>,
    ) -> Result<Outcome, PersistenceError> {
        let Some(snapshot) = snapshots.get(&alert.asset_class) else {
            return Ok(Outcome::NoData);
        };
        let Some(quote) = snapshot.get(&alert.symbol) else {
            debug!(alert_id = %alert.id, symbol = %alert.symbol, source = snapshot.source(), "No price this cycle");
            return Ok(Outcome::NoData);
        };

        let price = quote.price();
        if !alert.should_trigger(price) {
            return Ok(Outcome::NotMet);
        }

        if !self.store.mark_triggered(alert.id, now).await? {
            debug!(alert_id = %alert.id, "Alert already triggered elsewhere");
            return Ok(Outcome::NotMet);
        }
        info!(
            alert_id = %alert.id,
            symbol = %alert.symbol,
            condition = %alert.condition,
            target = %alert.target_price,
            price = %price,
            source = snapshot.source(),
            "Alert triggered"
        );

        let Some(user) = self.store.user_by_id(alert.user_id).await? else {
            warn!(alert_id = %alert.id, user_id = %alert.user_id, "Owner not found, alert not delivered");
            return Ok(Outcome::Fired { delivered: false });
        };

        let message = format_alert_message(alert, quote, &snapshot.provenance, now);
        match self.messenger.send(user.chat_id, &message).await {
            Ok(()) => {
                info!(alert_id = %alert.id, chat_id = user.chat_id, messenger = self.messenger.name(), "Alert delivered");
                Ok(Outcome::Fired { delivered: true })
            }
            Err(e) => {
                warn!(alert_id = %alert.id, chat_id = user.chat_id, error = %e, "Alert delivery failed");
                Ok(Outcome::Fired { delivered: false })
            }
        }
    }
}

#[async_trait]
impl Cycle for AlertEvaluator {
    fn name(&self) -> &str {
        "alerts"
    }

    async fn run_cycle(&self) -> Option<CycleStats> {
        AlertEvaluator::run_cycle(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedMarket, FlakyStore, RecordingMessenger};
    use finalert_core::{AlertCondition, AlertState, AlertStore, NewAlert, UserStore};
    use finalert_store::MemoryStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct Fixture {
        market: Arc<FixedMarket>,
        store: Arc<MemoryStore>,
        messenger: Arc<RecordingMessenger>,
        evaluator: AlertEvaluator,
    }

    fn fixture(market: FixedMarket, messenger: RecordingMessenger) -> Fixture {
        let market = Arc::new(market);
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(messenger);
        let evaluator = AlertEvaluator::new(market.clone(), store.clone(), messenger.clone());
        Fixture {
            market,
            store,
            messenger,
            evaluator,
        }
    }

    async fn add_alert(
        store: &MemoryStore,
        chat_id: i64,
        asset_class: AssetClass,
        symbol: &str,
        target: Decimal,
        condition: AlertCondition,
    ) -> Alert {
        let user = store.get_or_create_user(chat_id, None).await.unwrap();
        let alert = NewAlert {
            user_id: user.id,
            asset_class,
            symbol: symbol.into(),
            target_price: target,
            condition,
        }
        .into_alert(Utc::now())
        .unwrap();
        store.insert_alert(alert).await.unwrap()
    }

    async fn reload(store: &MemoryStore, alert: &Alert) -> Alert {
        store
            .alert_for_user(alert.id, alert.user_id)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_above_alert_triggers_and_sends_once() {
        let f = fixture(
            FixedMarket::new().with(AssetClass::Currency, vec![("USD", dec!(40.50))]),
            RecordingMessenger::new(),
        );
        let alert = add_alert(&f.store, 555, AssetClass::Currency, "USD", dec!(40.00), AlertCondition::Above).await;

        let stats = f.evaluator.run_cycle().await.unwrap();
        assert_eq!(stats.fired, 1);
        assert_eq!(stats.delivered, 1);

        let stored = reload(&f.store, &alert).await;
        assert!(!stored.is_active);
        assert!(stored.triggered_at.is_some());
        assert_eq!(stored.state(), AlertState::Triggered);

        let sent = f.messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 555);
        assert!(sent[0].1.contains("40,00 seviyesinin üstüne çıktı"));

        // Price stays above target: no second trigger.
        let stats = f.evaluator.run_cycle().await.unwrap();
        assert_eq!(stats.considered, 0);
        assert_eq!(f.messenger.attempts(), 1);
        assert_eq!(reload(&f.store, &alert).await.triggered_at, stored.triggered_at);
    }

    #[tokio::test]
    async fn test_below_alert_boundary() {
        let f = fixture(
            FixedMarket::new().with(AssetClass::Metal, vec![("gram", dec!(3000.01))]),
            RecordingMessenger::new(),
        );
        let alert = add_alert(&f.store, 1, AssetClass::Metal, "Gram Altın", dec!(3000), AlertCondition::Below).await;

        f.evaluator.run_cycle().await.unwrap();
        assert!(reload(&f.store, &alert).await.is_active);

        f.market.set(AssetClass::Metal, vec![("gram", dec!(3000))]);
        let stats = f.evaluator.run_cycle().await.unwrap();
        assert_eq!(stats.fired, 1);
        assert!(!reload(&f.store, &alert).await.is_active);
    }

    #[tokio::test]
    async fn test_send_failure_does_not_retrigger() {
        let f = fixture(
            FixedMarket::new().with(AssetClass::Currency, vec![("USD", dec!(41))]),
            RecordingMessenger::failing(),
        );
        let alert = add_alert(&f.store, 9, AssetClass::Currency, "USD", dec!(40), AlertCondition::Above).await;

        let stats = f.evaluator.run_cycle().await.unwrap();
        assert_eq!((stats.fired, stats.delivered), (1, 0));
        assert!(!reload(&f.store, &alert).await.is_active);

        f.evaluator.run_cycle().await.unwrap();
        assert_eq!(f.messenger.attempts(), 1);
    }

    #[tokio::test]
    async fn test_one_fetch_per_asset_class() {
        let f = fixture(
            FixedMarket::new()
                .with(AssetClass::Currency, vec![("USD", dec!(40)), ("EUR", dec!(47))])
                .with(AssetClass::Equity, vec![("THYAO", dec!(312))]),
            RecordingMessenger::new(),
        );
        for (symbol, target) in [("USD", dec!(50)), ("EUR", dec!(50)), ("GBP", dec!(60))] {
            add_alert(&f.store, 2, AssetClass::Currency, symbol, target, AlertCondition::Above).await;
        }
        add_alert(&f.store, 2, AssetClass::Equity, "THYAO", dec!(400), AlertCondition::Above).await;

        let stats = f.evaluator.run_cycle().await.unwrap();
        assert_eq!(stats.considered, 4);
        assert_eq!(stats.fired, 0);
        assert_eq!(stats.skipped, 1);
        assert_eq!(f.market.calls(AssetClass::Currency), 1);
        assert_eq!(f.market.calls(AssetClass::Equity), 1);
        assert_eq!(f.market.calls(AssetClass::Metal), 0);
    }

    #[tokio::test]
    async fn test_missing_symbol_is_skipped_not_zero() {
        let f = fixture(FixedMarket::new(), RecordingMessenger::new());
        let alert = add_alert(&f.store, 3, AssetClass::Currency, "USD", dec!(40), AlertCondition::Below).await;

        let stats = f.evaluator.run_cycle().await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert!(reload(&f.store, &alert).await.is_active);
        assert!(f.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_cycle_is_skipped() {
        let f = fixture(FixedMarket::new(), RecordingMessenger::new());
        let _guard = f.evaluator.running.lock().await;
        assert!(f.evaluator.run_cycle().await.is_none());
    }

    #[tokio::test]
    async fn test_persistence_failure_isolated_to_one_alert() {
        let market = Arc::new(FixedMarket::new().with(AssetClass::Currency, vec![("USD", dec!(41))]));
        let store = Arc::new(FlakyStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let evaluator = AlertEvaluator::new(market, store.clone(), messenger.clone());

        let broken = add_alert(store.inner(), 20, AssetClass::Currency, "USD", dec!(40), AlertCondition::Above).await;
        let healthy = add_alert(store.inner(), 21, AssetClass::Currency, "USD", dec!(40), AlertCondition::Above).await;
        store.break_entity(broken.id);

        let stats = evaluator.run_cycle().await.unwrap();
        assert_eq!(stats.considered, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!((stats.fired, stats.delivered), (1, 1));

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 21);
        assert!(reload(store.inner(), &broken).await.is_active);
        assert!(!reload(store.inner(), &healthy).await.is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_asset_class_does_not_block_others() {
        let f = fixture(
            FixedMarket::new()
                .with(AssetClass::Currency, vec![("USD", dec!(41))])
                .stalling(AssetClass::Equity),
            RecordingMessenger::new(),
        );
        let evaluator = AlertEvaluator::new(f.market.clone(), f.store.clone(), f.messenger.clone())
            .with_snapshot_timeout(Duration::from_secs(30));
        let usd = add_alert(&f.store, 30, AssetClass::Currency, "USD", dec!(40), AlertCondition::Above).await;
        let thyao = add_alert(&f.store, 30, AssetClass::Equity, "THYAO", dec!(300), AlertCondition::Above).await;

        let started = tokio::time::Instant::now();
        let stats = evaluator.run_cycle().await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(90));
        assert_eq!((stats.fired, stats.skipped), (1, 1));
        assert!(!reload(&f.store, &usd).await.is_active);
        assert!(reload(&f.store, &thyao).await.is_active);
        assert_eq!(f.messenger.sent().len(), 1);
    }
}
