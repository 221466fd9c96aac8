//! Outbound events delivered over the real-time channel.
//!
//! The engine returns these from each operation instead of emitting on the
//! channel itself; the gateway serializes them as tagged JSON payloads.

use serde::{Deserialize, Serialize};

/// One structured product recommendation extracted from an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
}

/// Events the server pushes to the client.
///
/// `BotReply` carries either `content` (plain text) or `products`
/// (structured suggestions), never both; the choice is made by the response
/// parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    ConversationInitialized {
        conversation_id: String,
    },
    BotReply {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        products: Option<Vec<ProductPayload>>,
        message_id: String,
        conversation_id: String,
        user_id: i64,
    },
    InfoMessage {
        content: String,
    },
}

impl OutboundEvent {
    pub fn info(content: impl Into<String>) -> Self {
        OutboundEvent::InfoMessage {
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_reply_with_products_omits_content_field() {
        let event = OutboundEvent::BotReply {
            content: None,
            products: Some(vec![ProductPayload {
                name: "Pixel 9".to_string(),
                description: "A phone".to_string(),
            }]),
            message_id: "m1".to_string(),
            conversation_id: "c1".to_string(),
            user_id: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"bot_reply\""));
        assert!(json.contains("\"products\""));
        assert!(!json.contains("\"content\""));
    }

    #[test]
    fn info_message_round_trips() {
        let event = OutboundEvent::info("session expired");
        let json = serde_json::to_string(&event).unwrap();
        let back: OutboundEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
