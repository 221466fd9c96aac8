//! Inbound events from the client, validated at the channel boundary.
//!
//! Every payload carries an `event` tag; anything that does not deserialize
//! into one of these variants is rejected before it can reach the engine.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A chat message for the current (or a new) conversation.
    UserMessage { content: String },
    /// Client-side storage changed; the gateway mirrors the conversation
    /// binding from it.
    LocalstorageSync {
        key: String,
        #[serde(default)]
        value: Option<String>,
        action: String,
    },
    /// Like or unlike one suggested product.
    ToggleLike {
        user_id: i64,
        message_id: String,
        conversation_id: String,
        product_name: String,
        liked: bool,
    },
    /// Client-side liveness probe.
    SessionCheck {},
}
