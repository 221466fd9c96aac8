//! Conversation repository: lifecycle and bookkeeping for conversations.
//!
//! Mutated only through the session manager. Rows flip `is_active` one way
//! (true→false) and advance `last_activity_at` on every turn.

use crate::error::StorageError;
use crate::models::ConversationRecord;
use crate::sqlite_pool::SqlitePoolManager;
use chrono::Utc;
use tracing::info;

#[derive(Clone)]
pub struct ConversationRepository {
    pool_manager: SqlitePoolManager,
}

impl ConversationRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                keywords TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_activity_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversations_user_id ON conversations(user_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Inserts a new active conversation with the given placeholder title.
    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
    ) -> Result<ConversationRecord, StorageError> {
        let record = ConversationRecord::new(user_id, title);
        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_id, title, keywords, is_active, created_at, last_activity_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.user_id)
        .bind(&record.title)
        .bind(&record.keywords)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.last_activity_at)
        .execute(self.pool_manager.pool())
        .await?;

        info!(conversation_id = %record.id, user_id, "Conversation started");
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Result<Option<ConversationRecord>, StorageError> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            "SELECT * FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(record)
    }

    /// All conversations for one user, most recently active first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConversationRecord>, StorageError> {
        let records = sqlx::query_as::<_, ConversationRecord>(
            "SELECT * FROM conversations WHERE user_id = ? ORDER BY last_activity_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }

    /// Replaces the stored keyword string (callers merge before writing).
    pub async fn set_keywords(&self, id: &str, keywords: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE conversations SET keywords = ? WHERE id = ?")
            .bind(keywords)
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(())
    }

    /// Advances `last_activity_at` to now.
    pub async fn touch(&self, id: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE conversations SET last_activity_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(())
    }

    /// Marks the conversation inactive. Terminal; there is no reactivation.
    pub async fn set_inactive(&self, id: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE conversations SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        info!(conversation_id = %id, "Conversation ended");
        Ok(())
    }

    pub async fn set_title(&self, id: &str, title: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE conversations SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(())
    }
}
