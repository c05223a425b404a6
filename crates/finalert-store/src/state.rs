//! In-memory tables shared by the store backends.

use chrono::{DateTime, Utc};
use finalert_core::{Alert, PersistenceError, RecurringNotification, User};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// All persisted entities, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StoreState {
    pub users: BTreeMap<Uuid, User>,
    pub alerts: BTreeMap<Uuid, Alert>,
    pub notifications: BTreeMap<Uuid, RecurringNotification>,
}

impl StoreState {
    pub fn active_alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .values()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        alerts.sort_by_key(|a| a.created_at);
        alerts
    }

    pub fn alerts_for_user(&self, user_id: Uuid) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        alerts.sort_by_key(|a| a.created_at);
        alerts
    }

    pub fn alert_for_user(&self, id: Uuid, user_id: Uuid) -> Option<Alert> {
        self.alerts
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned()
    }

    pub fn insert_alert(&mut self, alert: Alert) -> Alert {
        self.alerts.insert(alert.id, alert.clone());
        alert
    }

    pub fn mark_triggered(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<bool, PersistenceError> {
        let alert = self.alerts.get_mut(&id).ok_or_else(|| PersistenceError::NotFound {
            entity: "alert",
            id: id.to_string(),
        })?;
        Ok(alert.trigger(at))
    }

    pub fn deactivate_alert(&mut self, id: Uuid, user_id: Uuid) -> bool {
        match self.alerts.get_mut(&id) {
            Some(alert) if alert.user_id == user_id => alert.deactivate(),
            _ => false,
        }
    }

    pub fn active_notifications(&self) -> Vec<RecurringNotification> {
        let mut notifications: Vec<RecurringNotification> = self
            .notifications
            .values()
            .filter(|n| n.is_active)
            .cloned()
            .collect();
        notifications.sort_by_key(|n| n.created_at);
        notifications
    }

    pub fn notifications_for_user(&self, user_id: Uuid) -> Vec<RecurringNotification> {
        let mut notifications: Vec<RecurringNotification> = self
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by_key(|n| n.created_at);
        notifications
    }

    pub fn notification_for_user(&self, id: Uuid, user_id: Uuid) -> Option<RecurringNotification> {
        self.notifications
            .get(&id)
            .filter(|n| n.user_id == user_id)
            .cloned()
    }

    pub fn insert_notification(&mut self, notification: RecurringNotification) -> RecurringNotification {
        self.notifications
            .insert(notification.id, notification.clone());
        notification
    }

    pub fn mark_sent(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<(), PersistenceError> {
        let notification = self
            .notifications
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::NotFound {
                entity: "notification",
                id: id.to_string(),
            })?;
        notification.record_sent(at);
        Ok(())
    }

    pub fn deactivate_notification(&mut self, id: Uuid, user_id: Uuid) -> bool {
        match self.notifications.get_mut(&id) {
            Some(notification) if notification.user_id == user_id => notification.deactivate(),
            _ => false,
        }
    }

    pub fn user_by_chat_id(&self, chat_id: i64) -> Option<User> {
        self.users.values().find(|u| u.chat_id == chat_id).cloned()
    }

    /// Returns the user and whether it was created by this call.
    pub fn get_or_create_user(&mut self, chat_id: i64, username: Option<String>) -> (User, bool) {
        if let Some(user) = self.users.values_mut().find(|u| u.chat_id == chat_id) {
            if username.is_some() && user.username != username {
                user.username = username;
            }
            return (user.clone(), false);
        }
        let user = User::new(chat_id, username);
        self.users.insert(user.id, user.clone());
        (user, true)
    }
}
