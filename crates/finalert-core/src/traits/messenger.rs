//! Outbound messaging trait definition.

use crate::error::SendError;
use async_trait::async_trait;

/// Delivers text messages to chat recipients.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a message.
    ///
    /// # Arguments
    /// * `chat_id` - External chat identity of the recipient
    /// * `text` - Message body
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), SendError>;

    /// Get the messenger name.
    fn name(&self) -> &str;
}
