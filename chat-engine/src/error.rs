//! Engine error types.

use storage::StorageError;
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// LLM collaborator failures never appear here: they are recovered inside
/// the turn with a fallback reply. Storage failures are fatal to the turn and
/// leave the conversation at the last committed step.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(String),
}
