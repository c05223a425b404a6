//! Persistence collaborator traits.
//!
//! Every mutation touches a single entity. Implementations must make each
//! call atomic for that entity; no cross-entity transactions are needed.

use crate::error::PersistenceError;
use crate::types::{Alert, RecurringNotification, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Alert persistence.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Get all active alerts.
    async fn active_alerts(&self) -> Result<Vec<Alert>, PersistenceError>;

    /// Get all alerts owned by a user, active or not.
    async fn alerts_for_user(&self, user_id: Uuid) -> Result<Vec<Alert>, PersistenceError>;

    /// Get an alert by id, only if `user_id` owns it.
    async fn alert_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Alert>, PersistenceError>;

    /// Store a validated alert (see `NewAlert::into_alert`).
    async fn insert_alert(&self, alert: Alert) -> Result<Alert, PersistenceError>;

    /// Move an alert to the triggered state.
    ///
    /// # Returns
    /// `true` if this call performed the transition, `false` if the alert
    /// was already inactive. Callers deliver only on `true`.
    async fn mark_triggered(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, PersistenceError>;

    /// Soft-delete an alert owned by `user_id`. Returns false if there was
    /// no active alert to delete.
    async fn deactivate_alert(&self, id: Uuid, user_id: Uuid) -> Result<bool, PersistenceError>;
}

/// Recurring notification persistence.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Get all active notifications.
    async fn active_notifications(&self) -> Result<Vec<RecurringNotification>, PersistenceError>;

    /// Get all notifications owned by a user, active or not.
    async fn notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RecurringNotification>, PersistenceError>;

    /// Get a notification by id, only if `user_id` owns it.
    async fn notification_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RecurringNotification>, PersistenceError>;

    /// Store a validated notification (see `NewNotification::into_notification`).
    async fn insert_notification(
        &self,
        notification: RecurringNotification,
    ) -> Result<RecurringNotification, PersistenceError>;

    /// Record a send time. The stored value never moves backwards.
    async fn mark_sent(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PersistenceError>;

    /// Soft-delete a notification owned by `user_id`.
    async fn deactivate_notification(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, PersistenceError>;
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, PersistenceError>;

    /// Get a user by external chat identity.
    async fn user_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, PersistenceError>;

    /// Get the user for a chat identity, creating it on first contact.
    async fn get_or_create_user(
        &self,
        chat_id: i64,
        username: Option<String>,
    ) -> Result<User, PersistenceError>;
}

/// Everything the engine needs from persistence.
pub trait Store: AlertStore + NotificationStore + UserStore {}

impl<T: AlertStore + NotificationStore + UserStore> Store for T {}
