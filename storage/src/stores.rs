//! Stores bundle: one pool, all repositories, ready to hand to the engine.

use crate::{
    CategoryRepository, ConversationRepository, MessageRepository, SqlitePoolManager,
    StorageError, SuggestionRepository,
};

/// All repositories over a single SQLite pool.
#[derive(Clone)]
pub struct Stores {
    pub conversations: ConversationRepository,
    pub messages: MessageRepository,
    pub suggestions: SuggestionRepository,
    pub categories: CategoryRepository,
}

impl Stores {
    /// Connects to the database, creates missing tables, and returns the
    /// repository bundle.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::from_pool(pool_manager).await
    }

    /// Builds the bundle over an existing pool (tests share one in-memory DB
    /// this way).
    pub async fn from_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let stores = Self {
            conversations: ConversationRepository::new(pool_manager.clone()),
            messages: MessageRepository::new(pool_manager.clone()),
            suggestions: SuggestionRepository::new(pool_manager.clone()),
            categories: CategoryRepository::new(pool_manager),
        };
        stores.conversations.init().await?;
        stores.messages.init().await?;
        stores.suggestions.init().await?;
        stores.categories.init().await?;
        Ok(stores)
    }
}
