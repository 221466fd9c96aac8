//! Message repository: persistence and queries for conversation messages.
//!
//! Messages are immutable once created; structured product lists are
//! flattened to text by the caller before they reach this layer.

use crate::error::StorageError;
use crate::models::MessageRecord;
use crate::sqlite_pool::SqlitePoolManager;
use botify_core::SenderRole;
use tracing::info;

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                sender TEXT NOT NULL,
                content TEXT NOT NULL,
                sent_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Persists one message and returns the stored record (with its id).
    pub async fn save(
        &self,
        conversation_id: &str,
        sender: SenderRole,
        content: &str,
    ) -> Result<MessageRecord, StorageError> {
        let record = MessageRecord::new(conversation_id, sender, content);

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender, content, sent_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.conversation_id)
        .bind(&record.sender)
        .bind(&record.content)
        .bind(record.sent_at)
        .execute(self.pool_manager.pool())
        .await?;

        info!(
            message_id = %record.id,
            conversation_id = %record.conversation_id,
            sender = %record.sender,
            "Saved message"
        );
        Ok(record)
    }

    /// Full conversation history in send order. Same-timestamp rows keep
    /// insertion order via rowid.
    pub async fn history(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let messages = sqlx::query_as::<_, MessageRecord>(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY sent_at ASC, rowid ASC",
        )
        .bind(conversation_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(messages)
    }

    pub async fn get(&self, id: &str) -> Result<Option<MessageRecord>, StorageError> {
        let message = sqlx::query_as::<_, MessageRecord>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(message)
    }
}
