//! Chat users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user identified by their chat identity. Created on first interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// External chat identity, also the message recipient
    pub chat_id: i64,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user.
    pub fn new(chat_id: i64, username: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            username,
            created_at: Utc::now(),
        }
    }
}
