//! Storage crate: SQLite persistence for conversations, messages, product
//! suggestions and the category forest.
//!
//! ## Modules
//!
//! - [`error`] – Storage error type
//! - [`models`] – ConversationRecord, MessageRecord, SuggestionRecord,
//!   CategoryRecord, CategoryNode
//! - [`conversation_repo`] – ConversationRepository
//! - [`message_repo`] – MessageRepository
//! - [`suggestion_repo`] – SuggestionRepository
//! - [`category_repo`] – CategoryRepository
//! - [`sqlite_pool`] – SqlitePoolManager
//! - [`stores`] – Stores bundle (one pool, all repositories)

mod category_repo;
mod conversation_repo;
mod error;
mod message_repo;
mod models;
mod sqlite_pool;
mod stores;
mod suggestion_repo;

#[cfg(test)]
mod message_repo_test;

pub use category_repo::CategoryRepository;
pub use conversation_repo::ConversationRepository;
pub use error::StorageError;
pub use message_repo::MessageRepository;
pub use models::{
    CategoryNode, CategoryRecord, ConversationRecord, MessageRecord, SuggestionRecord,
};
pub use sqlite_pool::SqlitePoolManager;
pub use stores::Stores;
pub use suggestion_repo::SuggestionRepository;
