//! Record models mapping to the SQLite tables.

mod category;
mod conversation;
mod message;
mod suggestion;

pub use category::{CategoryNode, CategoryRecord};
pub use conversation::ConversationRecord;
pub use message::MessageRecord;
pub use suggestion::SuggestionRecord;
