//! Messenger that only writes to the log.

use async_trait::async_trait;
use finalert_core::{Messenger, SendError};
use tracing::info;

/// Logs every message instead of delivering it. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct LogMessenger;

impl LogMessenger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        info!(chat_id, chars = text.chars().count(), "Dry run message:\n{}", text);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
