//! Collaborator doubles for engine tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finalert_core::{
    Alert, AlertStore, AssetClass, AssetQuote, MarketData, Messenger, NotificationStore,
    PersistenceError, Provenance, QuoteMap, RecurringNotification, SendError, Snapshot, User,
    UserStore,
};
use finalert_store::MemoryStore;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Market data with fixed quotes per asset class and a call counter.
#[derive(Default)]
pub struct FixedMarket {
    quotes: Mutex<HashMap<AssetClass, Vec<(&'static str, Decimal)>>>,
    calls: Mutex<HashMap<AssetClass, usize>>,
    stalled: HashSet<AssetClass>,
}

impl FixedMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, asset_class: AssetClass, quotes: Vec<(&'static str, Decimal)>) -> Self {
        self.set(asset_class, quotes);
        self
    }

    /// Never answer for `asset_class`.
    pub fn stalling(mut self, asset_class: AssetClass) -> Self {
        self.stalled.insert(asset_class);
        self
    }

    pub fn set(&self, asset_class: AssetClass, quotes: Vec<(&'static str, Decimal)>) {
        self.quotes.lock().unwrap().insert(asset_class, quotes);
    }

    pub fn calls(&self, asset_class: AssetClass) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&asset_class)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl MarketData for FixedMarket {
    async fn snapshot(&self, asset_class: AssetClass) -> Snapshot {
        *self.calls.lock().unwrap().entry(asset_class).or_insert(0) += 1;
        if self.stalled.contains(&asset_class) {
            return std::future::pending().await;
        }
        let quotes = self.quotes.lock().unwrap().get(&asset_class).cloned();
        match quotes {
            Some(prices) => {
                let quotes: QuoteMap = prices
                    .into_iter()
                    .map(|(symbol, price)| {
                        let quote = AssetQuote::new(asset_class, symbol, None, price).unwrap();
                        (quote.symbol.clone(), quote)
                    })
                    .collect();
                Snapshot::new(asset_class, quotes, Provenance::Live("fixed".into()))
            }
            None => Snapshot::unavailable(asset_class, "fixed"),
        }
    }
}

/// Messenger that records messages and can be told to fail.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(i64, String)>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let messenger = Self::default();
        messenger.failing.store(true, Ordering::SeqCst);
        messenger
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SendError::Transport("connection refused".into()));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// In-memory store whose state transitions fail for chosen entities.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    broken: Mutex<HashSet<Uuid>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Make `mark_triggered` and `mark_sent` fail for `id`.
    pub fn break_entity(&self, id: Uuid) {
        self.broken.lock().unwrap().insert(id);
    }

    fn check(&self, id: Uuid) -> Result<(), PersistenceError> {
        if self.broken.lock().unwrap().contains(&id) {
            return Err(PersistenceError::Unavailable(format!("write rejected for {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl AlertStore for FlakyStore {
    async fn active_alerts(&self) -> Result<Vec<Alert>, PersistenceError> {
        self.inner.active_alerts().await
    }

    async fn alerts_for_user(&self, user_id: Uuid) -> Result<Vec<Alert>, PersistenceError> {
        self.inner.alerts_for_user(user_id).await
    }

    async fn alert_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Alert>, PersistenceError> {
        self.inner.alert_for_user(id, user_id).await
    }

    async fn insert_alert(&self, alert: Alert) -> Result<Alert, PersistenceError> {
        self.inner.insert_alert(alert).await
    }

    async fn mark_triggered(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, PersistenceError> {
        self.check(id)?;
        self.inner.mark_triggered(id, at).await
    }

    async fn deactivate_alert(&self, id: Uuid, user_id: Uuid) -> Result<bool, PersistenceError> {
        self.inner.deactivate_alert(id, user_id).await
    }
}

#[async_trait]
impl NotificationStore for FlakyStore {
    async fn active_notifications(&self) -> Result<Vec<RecurringNotification>, PersistenceError> {
        self.inner.active_notifications().await
    }

    async fn notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RecurringNotification>, PersistenceError> {
        self.inner.notifications_for_user(user_id).await
    }

    async fn notification_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RecurringNotification>, PersistenceError> {
        self.inner.notification_for_user(id, user_id).await
    }

    async fn insert_notification(
        &self,
        notification: RecurringNotification,
    ) -> Result<RecurringNotification, PersistenceError> {
        self.inner.insert_notification(notification).await
    }

    async fn mark_sent(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PersistenceError> {
        self.check(id)?;
        self.inner.mark_sent(id, at).await
    }

    async fn deactivate_notification(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, PersistenceError> {
        self.inner.deactivate_notification(id, user_id).await
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, PersistenceError> {
        self.inner.user_by_id(id).await
    }

    async fn user_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, PersistenceError> {
        self.inner.user_by_chat_id(chat_id).await
    }

    async fn get_or_create_user(
        &self,
        chat_id: i64,
        username: Option<String>,
    ) -> Result<User, PersistenceError> {
        self.inner.get_or_create_user(chat_id, username).await
    }
}
