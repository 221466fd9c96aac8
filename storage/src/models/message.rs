//! Message record model for persistence.
//!
//! Maps to the `messages` table and is used by MessageRepository.

use botify_core::SenderRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: String,
    pub conversation_id: String,
    /// Stored sender column value; see [`MessageRecord::sender_role`].
    pub sender: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Creates a new record with a generated UUID and current timestamp.
    pub fn new(conversation_id: impl Into<String>, sender: SenderRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            sender: sender.as_str().to_string(),
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn sender_role(&self) -> SenderRole {
        SenderRole::from_str_lossy(&self.sender)
    }
}
