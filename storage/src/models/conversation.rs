//! Conversation record model for persistence.
//!
//! Maps to the `conversations` table and is used by ConversationRepository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationRecord {
    pub id: String,
    pub user_id: i64,
    pub title: String,
    /// Comma-joined, union-accumulated keyword set. Empty string when none.
    pub keywords: String,
    /// One-way true→false; flipped on expiry or explicit end-of-chat.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl ConversationRecord {
    /// Creates a new active record with a generated UUID and current timestamps.
    pub fn new(user_id: i64, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title: title.into(),
            keywords: String::new(),
            is_active: true,
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Splits the stored keyword string back into the keyword set.
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}
