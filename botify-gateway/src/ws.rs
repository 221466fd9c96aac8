//! WebSocket endpoint: one connection per browser session.
//!
//! The receive loop is strictly sequential; a turn runs to completion before
//! the next inbound frame is read. Engine errors never cross the channel
//! raw; the client only ever sees tagged events.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use botify_core::OutboundEvent;
use chat_engine::{SessionManager, TurnContext};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::events::ClientEvent;

const LOGIN_REQUIRED: &str = "User session not found. Please log in again.";
const TURN_FAILED: &str = "Something went wrong. Please try again.";

/// Mutable per-connection state: who is talking and which conversation the
/// client believes it is in.
#[derive(Default)]
struct SessionState {
    user_id: Option<i64>,
    conversation_id: Option<String>,
}

pub struct GatewayState {
    pub engine: SessionManager,
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    let user_id = params.get("user_id").and_then(|v| v.parse::<i64>().ok());
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>, user_id: Option<i64>) {
    info!(?user_id, "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut session = SessionState {
        user_id,
        conversation_id: None,
    };

    while let Some(Ok(message)) = receiver.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let event = match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "Rejected malformed client event");
                continue;
            }
        };

        let replies = dispatch(&state, &mut session, event).await;
        for reply in &replies {
            let json = match serde_json::to_string(reply) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "Failed to serialize outbound event");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                info!(user_id = ?session.user_id, "WebSocket client went away mid-send");
                return;
            }
        }
    }

    info!(user_id = ?session.user_id, "WebSocket client disconnected");
}

/// Routes one validated client event and returns the events to emit back.
async fn dispatch(
    state: &GatewayState,
    session: &mut SessionState,
    event: ClientEvent,
) -> Vec<OutboundEvent> {
    match event {
        ClientEvent::UserMessage { content } => {
            let user_id = match session.user_id {
                Some(id) => id,
                None => return vec![OutboundEvent::info(LOGIN_REQUIRED)],
            };
            let ctx = TurnContext {
                user_id,
                conversation_id: session.conversation_id.clone(),
                user_context: None,
            };
            match state.engine.handle_turn(&ctx, &content).await {
                Ok(outcome) => {
                    session.conversation_id = Some(outcome.conversation_id);
                    outcome.events
                }
                Err(err) => {
                    warn!(user_id, error = %err, "Turn failed");
                    vec![OutboundEvent::info(TURN_FAILED)]
                }
            }
        }
        ClientEvent::LocalstorageSync { key, value, action } => {
            if key == "conversation_id" {
                session.conversation_id = match action.as_str() {
                    "remove" => None,
                    _ => value.filter(|v| !v.is_empty()),
                };
                debug!(conversation_id = ?session.conversation_id, "Conversation binding synced");
            }
            Vec::new()
        }
        ClientEvent::ToggleLike {
            user_id,
            message_id,
            conversation_id,
            product_name,
            liked,
        } => {
            if let Err(err) = state
                .engine
                .toggle_like(user_id, &message_id, &conversation_id, &product_name, liked)
                .await
            {
                warn!(user_id, error = %err, "Like toggle failed");
            }
            Vec::new()
        }
        ClientEvent::SessionCheck {} => {
            debug!(user_id = ?session.user_id, "Session check");
            Vec::new()
        }
    }
}
