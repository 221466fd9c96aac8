//! Product suggestion record model for persistence.
//!
//! Maps to the `product_suggestions` table; owned by exactly one message and
//! conversation. `category_id` is resolved eventually, never at creation.

use botify_core::ProductPayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SuggestionRecord {
    pub id: String,
    pub conversation_id: String,
    pub message_id: String,
    pub user_id: i64,
    pub product_name: String,
    pub product_description: String,
    pub liked: bool,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl SuggestionRecord {
    /// Creates a new unliked, uncategorized record with a generated UUID.
    pub fn new(
        user_id: i64,
        conversation_id: impl Into<String>,
        message_id: impl Into<String>,
        product: &ProductPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
            user_id,
            product_name: product.name.clone(),
            product_description: product.description.clone(),
            liked: false,
            category_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn payload(&self) -> ProductPayload {
        ProductPayload {
            name: self.product_name.clone(),
            description: self.product_description.clone(),
        }
    }
}
