//! Core types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Who authored a message inside a conversation.
///
/// `System` is used only for bookkeeping messages the engine appends itself
/// (e.g. the closing "Conversation ended." marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    User,
    Assistant,
    System,
}

impl SenderRole {
    /// Stable string form stored in the `messages.sender` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderRole::User => "user",
            SenderRole::Assistant => "assistant",
            SenderRole::System => "system",
        }
    }

    /// Parses the stored column value back; unknown values map to `System`
    /// so a corrupted row never panics a history read.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "user" => SenderRole::User,
            "assistant" => SenderRole::Assistant,
            _ => SenderRole::System,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_role_round_trips_through_column_value() {
        for role in [SenderRole::User, SenderRole::Assistant, SenderRole::System] {
            assert_eq!(SenderRole::from_str_lossy(role.as_str()), role);
        }
    }

    #[test]
    fn unknown_sender_maps_to_system() {
        assert_eq!(SenderRole::from_str_lossy("bot"), SenderRole::System);
    }
}
