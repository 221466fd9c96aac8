//! Product suggestion repository.
//!
//! A suggestion belongs to exactly one message and conversation. The liked
//! flag is toggled per `(user, message, conversation, product name)` tuple;
//! `category_id` is assigned after creation, never with it.

use crate::error::StorageError;
use crate::models::SuggestionRecord;
use crate::sqlite_pool::SqlitePoolManager;
use botify_core::ProductPayload;
use tracing::info;

#[derive(Clone)]
pub struct SuggestionRepository {
    pool_manager: SqlitePoolManager,
}

impl SuggestionRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS product_suggestions (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                message_id TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                product_name TEXT NOT NULL,
                product_description TEXT NOT NULL,
                liked INTEGER NOT NULL DEFAULT 0,
                category_id INTEGER,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_suggestions_message ON product_suggestions(conversation_id, message_id)",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_suggestions_user ON product_suggestions(user_id, liked)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Persists one row per structured product for a single assistant message.
    pub async fn save_all(
        &self,
        user_id: i64,
        conversation_id: &str,
        message_id: &str,
        products: &[ProductPayload],
    ) -> Result<Vec<SuggestionRecord>, StorageError> {
        let mut records = Vec::with_capacity(products.len());
        for product in products {
            let record = SuggestionRecord::new(user_id, conversation_id, message_id, product);
            sqlx::query(
                r#"
                INSERT INTO product_suggestions
                    (id, conversation_id, message_id, user_id, product_name, product_description, liked, category_id, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(&record.conversation_id)
            .bind(&record.message_id)
            .bind(record.user_id)
            .bind(&record.product_name)
            .bind(&record.product_description)
            .bind(record.liked)
            .bind(record.category_id)
            .bind(record.created_at)
            .execute(self.pool_manager.pool())
            .await?;
            records.push(record);
        }

        info!(
            count = records.len(),
            conversation_id, message_id, "Product suggestions saved"
        );
        Ok(records)
    }

    /// Sets the liked flag for the exact suggestion tuple. Returns whether a
    /// row matched; the same product name in other conversations is untouched.
    pub async fn set_liked(
        &self,
        user_id: i64,
        message_id: &str,
        conversation_id: &str,
        product_name: &str,
        liked: bool,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE product_suggestions SET liked = ?
            WHERE user_id = ? AND message_id = ? AND conversation_id = ? AND product_name = ?
            "#,
        )
        .bind(liked)
        .bind(user_id)
        .bind(message_id)
        .bind(conversation_id)
        .bind(product_name)
        .execute(self.pool_manager.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores the eventually-resolved category for one suggestion.
    pub async fn assign_category(
        &self,
        suggestion_id: &str,
        category_id: i64,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE product_suggestions SET category_id = ? WHERE id = ?")
            .bind(category_id)
            .bind(suggestion_id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<SuggestionRecord>, StorageError> {
        let record = sqlx::query_as::<_, SuggestionRecord>(
            "SELECT * FROM product_suggestions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(record)
    }

    /// Suggestions attached to one assistant message, for history restore.
    pub async fn for_message(
        &self,
        conversation_id: &str,
        message_id: &str,
        user_id: i64,
    ) -> Result<Vec<SuggestionRecord>, StorageError> {
        let records = sqlx::query_as::<_, SuggestionRecord>(
            r#"
            SELECT * FROM product_suggestions
            WHERE conversation_id = ? AND message_id = ? AND user_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(conversation_id)
        .bind(message_id)
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }

    /// All liked suggestions for one user, newest first.
    pub async fn liked_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<SuggestionRecord>, StorageError> {
        let records = sqlx::query_as::<_, SuggestionRecord>(
            "SELECT * FROM product_suggestions WHERE user_id = ? AND liked = 1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }
}
