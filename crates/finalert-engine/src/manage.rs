//! User-facing management of alerts and report subscriptions.
//!
//! Callers identify users by chat identity; users are created lazily on
//! first use. Every operation is scoped to the calling user.

use chrono::Utc;
use finalert_core::{
    Alert, AlertCondition, AssetClass, FinAlertResult, IntervalKind, NewAlert, NewNotification,
    RecurringNotification, Store, User,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Management operations over the store.
pub struct SubscriptionService {
    store: Arc<dyn Store>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get the user for a chat, creating it on first contact.
    pub async fn register(&self, chat_id: i64, username: Option<String>) -> FinAlertResult<User> {
        Ok(self.store.get_or_create_user(chat_id, username).await?)
    }

    /// Create a price alert.
    ///
    /// # Arguments
    /// * `chat_id` - Owner's chat identity
    /// * `asset_class` - Class the symbol belongs to
    /// * `symbol` - Symbol in any accepted spelling, normalized before storage
    /// * `target_price` - Threshold, must be positive
    /// * `condition` - Crossing direction
    pub async fn create_alert(
        &self,
        chat_id: i64,
        asset_class: AssetClass,
        symbol: &str,
        target_price: Decimal,
        condition: AlertCondition,
    ) -> FinAlertResult<Alert> {
        let user = self.register(chat_id, None).await?;
        let alert = NewAlert {
            user_id: user.id,
            asset_class,
            symbol: symbol.to_string(),
            target_price,
            condition,
        }
        .into_alert(Utc::now())?;
        let alert = self.store.insert_alert(alert).await?;

        info!(
            alert_id = %alert.id,
            chat_id,
            symbol = %alert.symbol,
            condition = %alert.condition,
            target = %alert.target_price,
            "Alert created"
        );
        Ok(alert)
    }

    /// All alerts of a chat, newest first. Unknown chats have none.
    pub async fn list_alerts(&self, chat_id: i64) -> FinAlertResult<Vec<Alert>> {
        let Some(user) = self.store.user_by_chat_id(chat_id).await? else {
            return Ok(Vec::new());
        };
        let mut alerts = self.store.alerts_for_user(user.id).await?;
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    /// Soft-delete an alert. Returns false if the chat owns no such active alert.
    pub async fn delete_alert(&self, chat_id: i64, alert_id: Uuid) -> FinAlertResult<bool> {
        let Some(user) = self.store.user_by_chat_id(chat_id).await? else {
            return Ok(false);
        };
        let deleted = self.store.deactivate_alert(alert_id, user.id).await?;
        if deleted {
            info!(%alert_id, chat_id, "Alert deleted");
        }
        Ok(deleted)
    }

    /// Subscribe a chat to recurring reports.
    pub async fn create_notification(
        &self,
        chat_id: i64,
        interval: IntervalKind,
        asset_classes: BTreeSet<AssetClass>,
    ) -> FinAlertResult<RecurringNotification> {
        let user = self.register(chat_id, None).await?;
        let notification = NewNotification {
            user_id: user.id,
            interval,
            asset_classes,
        }
        .into_notification(Utc::now())?;
        let notification = self.store.insert_notification(notification).await?;

        info!(
            notification_id = %notification.id,
            chat_id,
            %interval,
            "Notification created"
        );
        Ok(notification)
    }

    pub async fn list_notifications(
        &self,
        chat_id: i64,
    ) -> FinAlertResult<Vec<RecurringNotification>> {
        let Some(user) = self.store.user_by_chat_id(chat_id).await? else {
            return Ok(Vec::new());
        };
        let mut notifications = self.store.notifications_for_user(user.id).await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    pub async fn delete_notification(
        &self,
        chat_id: i64,
        notification_id: Uuid,
    ) -> FinAlertResult<bool> {
        let Some(user) = self.store.user_by_chat_id(chat_id).await? else {
            return Ok(false);
        };
        let deleted = self
            .store
            .deactivate_notification(notification_id, user.id)
            .await?;
        if deleted {
            info!(%notification_id, chat_id, "Notification deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finalert_core::{AlertState, FinAlertError, ValidationError};
    use finalert_store::MemoryStore;
    use rust_decimal_macros::dec;

    fn service() -> SubscriptionService {
        SubscriptionService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_alert_registers_user() {
        let service = service();
        let alert = service
            .create_alert(42, AssetClass::Equity, "thyao.is", dec!(350), AlertCondition::Above)
            .await
            .unwrap();

        assert_eq!(alert.symbol, "THYAO");
        assert_eq!(alert.state(), AlertState::Active);
        assert_eq!(service.list_alerts(42).await.unwrap(), vec![alert]);
    }

    #[tokio::test]
    async fn test_create_alert_rejects_non_positive_target() {
        let err = service()
            .create_alert(42, AssetClass::Currency, "USD", dec!(0), AlertCondition::Below)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FinAlertError::Validation(ValidationError::NonPositivePrice(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_owner() {
        let service = service();
        let alert = service
            .create_alert(1, AssetClass::Currency, "EUR", dec!(50), AlertCondition::Above)
            .await
            .unwrap();
        service.register(2, Some("other".into())).await.unwrap();

        assert!(!service.delete_alert(2, alert.id).await.unwrap());
        assert!(!service.delete_alert(3, alert.id).await.unwrap());
        assert!(service.delete_alert(1, alert.id).await.unwrap());
        assert!(!service.delete_alert(1, alert.id).await.unwrap());

        let alerts = service.list_alerts(1).await.unwrap();
        assert_eq!(alerts[0].state(), AlertState::Deleted);
    }

    #[tokio::test]
    async fn test_notification_lifecycle() {
        let service = service();
        assert!(service.list_notifications(5).await.unwrap().is_empty());

        let err = service
            .create_notification(5, IntervalKind::Daily, BTreeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FinAlertError::Validation(ValidationError::EmptyAssetClasses)
        ));

        let classes = [AssetClass::Metal, AssetClass::Equity].into_iter().collect();
        let n = service
            .create_notification(5, IntervalKind::Every4h, classes)
            .await
            .unwrap();
        assert!(n.last_sent_at.is_none());
        assert_eq!(service.list_notifications(5).await.unwrap().len(), 1);

        assert!(service.delete_notification(5, n.id).await.unwrap());
        assert!(!service.list_notifications(5).await.unwrap()[0].is_active);
    }
}
