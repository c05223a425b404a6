//! Volatile in-process store.

use crate::state::StoreState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finalert_core::{
    Alert, AlertStore, NotificationStore, PersistenceError, RecurringNotification, User, UserStore,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store that keeps everything in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn active_alerts(&self) -> Result<Vec<Alert>, PersistenceError> {
        Ok(self.state.read().await.active_alerts())
    }

    async fn alerts_for_user(&self, user_id: Uuid) -> Result<Vec<Alert>, PersistenceError> {
        Ok(self.state.read().await.alerts_for_user(user_id))
    }

    async fn alert_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Alert>, PersistenceError> {
        Ok(self.state.read().await.alert_for_user(id, user_id))
    }

    async fn insert_alert(&self, alert: Alert) -> Result<Alert, PersistenceError> {
        Ok(self.state.write().await.insert_alert(alert))
    }

    async fn mark_triggered(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, PersistenceError> {
        self.state.write().await.mark_triggered(id, at)
    }

    async fn deactivate_alert(&self, id: Uuid, user_id: Uuid) -> Result<bool, PersistenceError> {
        Ok(self.state.write().await.deactivate_alert(id, user_id))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn active_notifications(&self) -> Result<Vec<RecurringNotification>, PersistenceError> {
        Ok(self.state.read().await.active_notifications())
    }

    async fn notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RecurringNotification>, PersistenceError> {
        Ok(self.state.read().await.notifications_for_user(user_id))
    }

    async fn notification_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RecurringNotification>, PersistenceError> {
        Ok(self.state.read().await.notification_for_user(id, user_id))
    }

    async fn insert_notification(
        &self,
        notification: RecurringNotification,
    ) -> Result<RecurringNotification, PersistenceError> {
        Ok(self.state.write().await.insert_notification(notification))
    }

    async fn mark_sent(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PersistenceError> {
        self.state.write().await.mark_sent(id, at)
    }

    async fn deactivate_notification(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, PersistenceError> {
        Ok(self.state.write().await.deactivate_notification(id, user_id))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, PersistenceError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn user_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, PersistenceError> {
        Ok(self.state.read().await.user_by_chat_id(chat_id))
    }

    async fn get_or_create_user(
        &self,
        chat_id: i64,
        username: Option<String>,
    ) -> Result<User, PersistenceError> {
        Ok(self.state.write().await.get_or_create_user(chat_id, username).0)
    }
}
