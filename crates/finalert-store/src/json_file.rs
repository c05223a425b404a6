//! Durable store backed by a single JSON document.

use crate::state::StoreState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finalert_core::{
    Alert, AlertStore, NotificationStore, PersistenceError, RecurringNotification, User, UserStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Store that rewrites a JSON file after every mutation.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target. A mutation whose write fails is not applied in memory either.
/// Each write and its in-memory commit run on their own task, so dropping
/// the calling future cannot leave the file ahead of memory.
#[derive(Debug)]
pub struct JsonFileStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => StoreState::default(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Store file not found, starting empty");
                StoreState::default()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(
            path = %path.display(),
            users = state.users.len(),
            alerts = state.alerts.len(),
            notifications = state.notifications.len(),
            "Opened store"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                path,
                state: Mutex::new(state),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Apply `f` to a copy of the state, persist it, then commit it.
    async fn mutate<T, F>(&self, f: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut StoreState) -> Result<T, PersistenceError> + Send + 'static,
    {
        let inner = self.inner.clone();
        let write = tokio::spawn(async move {
            let mut state = inner.state.lock().await;
            let mut next = state.clone();
            let value = f(&mut next)?;
            if next != *state {
                inner.persist(&next).await?;
                *state = next;
            }
            Ok(value)
        });

        match write.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(path = %self.inner.path.display(), error = %e, "Store write task failed");
                Err(PersistenceError::Unavailable(format!("store write task failed: {}", e)))
            }
        }
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&*self.inner.state.lock().await)
    }
}

impl Inner {
    async fn persist(&self, state: &StoreState) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl AlertStore for JsonFileStore {
    async fn active_alerts(&self) -> Result<Vec<Alert>, PersistenceError> {
        Ok(self.read(StoreState::active_alerts).await)
    }

    async fn alerts_for_user(&self, user_id: Uuid) -> Result<Vec<Alert>, PersistenceError> {
        Ok(self.read(|s| s.alerts_for_user(user_id)).await)
    }

    async fn alert_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Alert>, PersistenceError> {
        Ok(self.read(|s| s.alert_for_user(id, user_id)).await)
    }

    async fn insert_alert(&self, alert: Alert) -> Result<Alert, PersistenceError> {
        self.mutate(move |s| Ok(s.insert_alert(alert))).await
    }

    async fn mark_triggered(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, PersistenceError> {
        self.mutate(move |s| s.mark_triggered(id, at)).await
    }

    async fn deactivate_alert(&self, id: Uuid, user_id: Uuid) -> Result<bool, PersistenceError> {
        self.mutate(move |s| Ok(s.deactivate_alert(id, user_id))).await
    }
}

#[async_trait]
impl NotificationStore for JsonFileStore {
    async fn active_notifications(&self) -> Result<Vec<RecurringNotification>, PersistenceError> {
        Ok(self.read(StoreState::active_notifications).await)
    }

    async fn notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RecurringNotification>, PersistenceError> {
        Ok(self.read(|s| s.notifications_for_user(user_id)).await)
    }

    async fn notification_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RecurringNotification>, PersistenceError> {
        Ok(self.read(|s| s.notification_for_user(id, user_id)).await)
    }

    async fn insert_notification(
        &self,
        notification: RecurringNotification,
    ) -> Result<RecurringNotification, PersistenceError> {
        self.mutate(move |s| Ok(s.insert_notification(notification))).await
    }

    async fn mark_sent(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PersistenceError> {
        self.mutate(move |s| s.mark_sent(id, at)).await
    }

    async fn deactivate_notification(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, PersistenceError> {
        self.mutate(move |s| Ok(s.deactivate_notification(id, user_id)))
            .await
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, PersistenceError> {
        Ok(self.read(|s| s.users.get(&id).cloned()).await)
    }

    async fn user_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, PersistenceError> {
        Ok(self.read(|s| s.user_by_chat_id(chat_id)).await)
    }

    async fn get_or_create_user(
        &self,
        chat_id: i64,
        username: Option<String>,
    ) -> Result<User, PersistenceError> {
        self.mutate(move |s| Ok(s.get_or_create_user(chat_id, username).0))
            .await
    }
}
