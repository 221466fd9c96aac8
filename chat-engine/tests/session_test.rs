//! End-to-end engine tests over an in-memory database with a scripted
//! collaborator.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use botify_core::{OutboundEvent, SenderRole};
use chat_engine::prompts::FALLBACK_REPLY;
use chat_engine::session::{EXPIRY_NOTICE, TIMEOUT_TITLE};
use chat_engine::{SessionManager, TurnContext};
use llm_client::{ChatMessage, LlmClient, LlmError};
use storage::{SqlitePoolManager, Stores};
use tokio::sync::Mutex;

/// Collaborator that replays a fixed script of responses in order.
struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedLlm {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.replies
            .lock()
            .await
            .pop_front()
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Collaborator that always fails, as a timed-out upstream would.
struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        Err(LlmError::Timeout(60))
    }
}

async fn setup(llm: Arc<dyn LlmClient>) -> (SessionManager, Stores, SqlitePoolManager) {
    let pool_manager = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("in-memory pool");
    let stores = Stores::from_pool(pool_manager.clone())
        .await
        .expect("init stores");
    let engine = SessionManager::new(stores.clone(), llm);
    (engine, stores, pool_manager)
}

fn turn(user_id: i64, conversation_id: Option<&str>) -> TurnContext {
    TurnContext {
        user_id,
        conversation_id: conversation_id.map(str::to_string),
        user_context: None,
    }
}

#[tokio::test]
async fn first_turn_opens_conversation_and_replies() {
    let llm = ScriptedLlm::new(&["Look at battery life and weight."]);
    let (engine, stores, _pool) = setup(llm).await;

    let outcome = engine
        .handle_turn(&turn(1, None), "I need a new laptop for travel")
        .await
        .expect("turn");

    assert_eq!(outcome.events.len(), 2);
    assert!(matches!(
        outcome.events[0],
        OutboundEvent::ConversationInitialized { .. }
    ));
    match &outcome.events[1] {
        OutboundEvent::BotReply {
            content, products, ..
        } => {
            assert_eq!(content.as_deref(), Some("Look at battery life and weight."));
            assert!(products.is_none());
        }
        other => panic!("expected bot reply, got {:?}", other),
    }

    let conversation = stores
        .conversations
        .get(&outcome.conversation_id)
        .await
        .expect("query")
        .expect("conversation exists");
    assert!(conversation.is_active);
    assert_eq!(conversation.title, "Chat Session");
    assert!(conversation.keywords.contains("Laptop"));

    let history = stores
        .messages
        .history(&outcome.conversation_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender_role(), SenderRole::User);
    assert_eq!(history[1].sender_role(), SenderRole::Assistant);
}

#[tokio::test]
async fn second_turn_reuses_active_conversation() {
    let llm = ScriptedLlm::new(&["First answer.", "Second answer."]);
    let (engine, stores, _pool) = setup(llm).await;

    let first = engine
        .handle_turn(&turn(1, None), "recommend a camera")
        .await
        .expect("first turn");
    let second = engine
        .handle_turn(
            &turn(1, Some(&first.conversation_id)),
            "what about tripods",
        )
        .await
        .expect("second turn");

    assert_eq!(second.conversation_id, first.conversation_id);
    // No new ConversationInitialized on a reused conversation.
    assert!(second
        .events
        .iter()
        .all(|e| !matches!(e, OutboundEvent::ConversationInitialized { .. })));

    let history = stores
        .messages
        .history(&first.conversation_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn expired_conversation_is_retired_and_replaced() {
    let llm = ScriptedLlm::new(&["First answer.", "Second answer."]);
    let (engine, stores, pool_manager) = setup(llm).await;

    let first = engine
        .handle_turn(&turn(1, None), "recommend a phone")
        .await
        .expect("first turn");

    // Backdate the conversation past the idle window.
    let stale = chrono::Utc::now() - chrono::Duration::minutes(31);
    sqlx::query("UPDATE conversations SET last_activity_at = ? WHERE id = ?")
        .bind(stale)
        .bind(&first.conversation_id)
        .execute(pool_manager.pool())
        .await
        .expect("backdate");

    let second = engine
        .handle_turn(&turn(1, Some(&first.conversation_id)), "and tablets?")
        .await
        .expect("second turn");

    assert_ne!(second.conversation_id, first.conversation_id);
    assert!(second
        .events
        .iter()
        .any(|e| matches!(e, OutboundEvent::InfoMessage { content } if content == EXPIRY_NOTICE)));
    assert!(second
        .events
        .iter()
        .any(|e| matches!(e, OutboundEvent::ConversationInitialized { .. })));

    let old = stores
        .conversations
        .get(&first.conversation_id)
        .await
        .expect("query")
        .expect("old conversation");
    assert!(!old.is_active);

    let new = stores
        .conversations
        .get(&second.conversation_id)
        .await
        .expect("query")
        .expect("new conversation");
    assert!(new.is_active);
    assert_eq!(new.title, TIMEOUT_TITLE);

    // The second question landed in the new conversation.
    let history = stores
        .messages
        .history(&second.conversation_id)
        .await
        .expect("history");
    assert_eq!(history[0].content, "and tablets?");
}

#[tokio::test]
async fn collaborator_failure_degrades_to_fallback_reply() {
    let (engine, stores, _pool) = setup(Arc::new(FailingLlm)).await;

    let outcome = engine
        .handle_turn(&turn(1, None), "recommend a monitor")
        .await
        .expect("turn must not fail");

    match outcome.events.last() {
        Some(OutboundEvent::BotReply { content, .. }) => {
            assert_eq!(content.as_deref(), Some(FALLBACK_REPLY));
        }
        other => panic!("expected bot reply, got {:?}", other),
    }

    // Both sides of the exchange are still persisted.
    let history = stores
        .messages
        .history(&outcome.conversation_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn structured_reply_persists_suggestions_and_titles_conversation() {
    let product_reply = "\
<PRODUCT> - Pixel 9 - A compact Android phone.
<PRODUCT> - iPhone 16 - Apple's current baseline phone.";
    let llm = ScriptedLlm::new(&[
        product_reply,
        "<TITLE>Compact Smartphones Worth Buying This Year</TITLE>",
    ]);
    let (engine, stores, _pool) = setup(llm).await;

    let outcome = engine
        .handle_turn(&turn(7, None), "recommend a compact smartphone")
        .await
        .expect("turn");

    let (message_id, products) = match outcome.events.last() {
        Some(OutboundEvent::BotReply {
            content,
            products: Some(products),
            message_id,
            ..
        }) => {
            assert!(content.is_none());
            (message_id.clone(), products.clone())
        }
        other => panic!("expected product reply, got {:?}", other),
    };
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Pixel 9");

    let saved = stores
        .suggestions
        .for_message(&outcome.conversation_id, &message_id, 7)
        .await
        .expect("suggestions");
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|s| !s.liked && s.category_id.is_none()));

    // The assistant message keeps the raw marker text for history.
    let stored = stores
        .messages
        .get(&message_id)
        .await
        .expect("query")
        .expect("message");
    assert!(stored.content.contains("<PRODUCT> - Pixel 9"));

    let conversation = stores
        .conversations
        .get(&outcome.conversation_id)
        .await
        .expect("query")
        .expect("conversation");
    assert_eq!(conversation.title, "Compact Smartphones Worth Buying This Year");
}

#[tokio::test]
async fn like_toggle_is_scoped_to_the_exact_suggestion() {
    let llm = ScriptedLlm::new(&[
        "<PRODUCT> - Pixel 9 - A compact Android phone.",
        "<TITLE>Compact Phone Picks For You</TITLE>",
    ]);
    let (engine, _stores, _pool) = setup(llm).await;

    let outcome = engine
        .handle_turn(&turn(7, None), "recommend a compact smartphone")
        .await
        .expect("turn");
    let message_id = match outcome.events.last() {
        Some(OutboundEvent::BotReply { message_id, .. }) => message_id.clone(),
        other => panic!("expected bot reply, got {:?}", other),
    };

    let matched = engine
        .toggle_like(7, &message_id, &outcome.conversation_id, "Pixel 9", true)
        .await
        .expect("toggle");
    assert!(matched);

    // Same product name, wrong conversation: no row matches.
    let missed = engine
        .toggle_like(7, &message_id, "other-conversation", "Pixel 9", true)
        .await
        .expect("toggle");
    assert!(!missed);
}

#[tokio::test]
async fn end_chat_retires_conversation_and_sets_final_title() {
    let llm = ScriptedLlm::new(&[
        "Consider aperture and zoom range.",
        "<TITLE>Choosing A Camera For Travel</TITLE>",
    ]);
    let (engine, stores, _pool) = setup(llm).await;

    let outcome = engine
        .handle_turn(&turn(3, None), "help me choose a travel camera")
        .await
        .expect("turn");

    engine
        .end_chat(3, &outcome.conversation_id)
        .await
        .expect("end chat");

    let conversation = stores
        .conversations
        .get(&outcome.conversation_id)
        .await
        .expect("query")
        .expect("conversation");
    assert!(!conversation.is_active);
    assert_eq!(conversation.title, "Choosing A Camera For Travel");

    let history = stores
        .messages
        .history(&outcome.conversation_id)
        .await
        .expect("history");
    assert_eq!(
        history.last().map(|m| m.sender_role()),
        Some(SenderRole::System)
    );
}

#[tokio::test]
async fn assign_category_resolves_and_stores_leaf_id() {
    let llm = ScriptedLlm::new(&[
        "<PRODUCT> - Pixel 9 - A compact Android phone.",
        "<TITLE>Compact Phone Picks For You</TITLE>",
        "Electronics",
        "Phones",
        "Smartphones",
    ]);
    let (engine, stores, _pool) = setup(llm).await;

    let electronics = stores
        .categories
        .insert("Electronics", None)
        .await
        .expect("seed");
    let phones = stores
        .categories
        .insert("Phones", Some(electronics))
        .await
        .expect("seed");
    let smartphones = stores
        .categories
        .insert("Smartphones", Some(phones))
        .await
        .expect("seed");

    let outcome = engine
        .handle_turn(&turn(7, None), "recommend a compact smartphone")
        .await
        .expect("turn");
    let message_id = match outcome.events.last() {
        Some(OutboundEvent::BotReply { message_id, .. }) => message_id.clone(),
        other => panic!("expected bot reply, got {:?}", other),
    };

    let suggestion = stores
        .suggestions
        .for_message(&outcome.conversation_id, &message_id, 7)
        .await
        .expect("suggestions")
        .into_iter()
        .next()
        .expect("one suggestion");

    let assigned = engine
        .assign_category(&suggestion.id)
        .await
        .expect("assign");
    assert_eq!(assigned, Some(smartphones));

    let stored = stores
        .suggestions
        .get(&suggestion.id)
        .await
        .expect("query")
        .expect("suggestion");
    assert_eq!(stored.category_id, Some(smartphones));
}

#[tokio::test]
async fn end_chat_rejects_foreign_conversation() {
    let llm = ScriptedLlm::new(&["Sure."]);
    let (engine, _stores, _pool) = setup(llm).await;

    let outcome = engine
        .handle_turn(&turn(3, None), "hello")
        .await
        .expect("turn");

    let err = engine
        .end_chat(99, &outcome.conversation_id)
        .await
        .expect_err("must reject another user's conversation");
    assert!(matches!(
        err,
        chat_engine::EngineError::ConversationNotFound(_)
    ));
}
