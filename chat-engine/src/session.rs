//! Session manager: conversation lifecycle and the per-turn pipeline.
//!
//! Every operation takes an explicit [`TurnContext`] and returns a
//! [`TurnOutcome`]; the engine holds no per-user mutable state of its own.
//! Expiry is lazy: a conversation past the idle window is only noticed (and
//! retired) when its user sends the next message.

use std::sync::Arc;

use botify_core::{OutboundEvent, SenderRole};
use chrono::{Duration, Utc};
use llm_client::{ChatMessage, LlmClient};
use serde::Deserialize;
use storage::{
    ConversationRecord, ConversationRepository, MessageRecord, MessageRepository,
    SuggestionRepository,
};
use tracing::{info, warn};

use crate::category::CategoryResolver;
use crate::error::EngineError;
use crate::keyword;
use crate::parser::{parse_reply, ParsedReply};
use crate::prompts::{recommender_system_prompt, FALLBACK_REPLY};
use crate::title::{self, TitleGenerator, DEFAULT_TITLE};

/// Minutes of inactivity after which a conversation is considered expired.
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

/// Placeholder title for a conversation opened because the previous one
/// expired mid-session.
pub const TIMEOUT_TITLE: &str = "New Chat After Timeout";

/// Notice pushed to the client when a stale conversation is retired.
pub const EXPIRY_NOTICE: &str =
    "Your chat session has expired. A new conversation has been started.";

/// Optional demographic context attached to a turn, folded into the system
/// prompt when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserContext {
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub country: Option<String>,
}

/// Everything the engine needs to know about the incoming turn.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub user_id: i64,
    /// Conversation the client believes it is in, if any. The engine may
    /// replace it (expiry, unknown id) and reports the effective one back.
    pub conversation_id: Option<String>,
    pub user_context: Option<UserContext>,
}

/// Result of one turn: the conversation the turn actually ran in plus the
/// events to emit, in order.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub conversation_id: String,
    pub events: Vec<OutboundEvent>,
}

/// Orchestrates conversations end to end: resolve-or-open, persist, prompt,
/// parse, persist again, title.
#[derive(Clone)]
pub struct SessionManager {
    conversations: ConversationRepository,
    messages: MessageRepository,
    suggestions: SuggestionRepository,
    llm: Arc<dyn LlmClient>,
    titles: TitleGenerator,
    resolver: CategoryResolver,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(
        stores: storage::Stores,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let titles = TitleGenerator::new(llm.clone());
        let resolver = CategoryResolver::new(stores.categories, llm.clone());
        Self {
            conversations: stores.conversations,
            messages: stores.messages,
            suggestions: stores.suggestions,
            llm,
            titles,
            resolver,
            idle_timeout: Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES),
        }
    }

    pub fn with_idle_timeout(mut self, minutes: i64) -> Self {
        self.idle_timeout = Duration::minutes(minutes);
        self
    }

    pub fn category_resolver(&self) -> &CategoryResolver {
        &self.resolver
    }

    /// Runs one full turn: resolve the conversation, persist the user
    /// message, call the collaborator, persist the reply, and return the
    /// events to emit.
    pub async fn handle_turn(
        &self,
        ctx: &TurnContext,
        content: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let mut events = Vec::new();
        let conversation = self.resolve_conversation(ctx, &mut events).await?;

        self.messages
            .save(&conversation.id, SenderRole::User, content)
            .await?;

        // Keywords accumulate per conversation as a union across turns.
        let extracted = keyword::extract(content, keyword::DEFAULT_TOP_N);
        let merged = keyword::merge(&conversation.keywords, &extracted);
        if merged != conversation.keywords {
            self.conversations
                .set_keywords(&conversation.id, &merged)
                .await?;
        }
        self.conversations.touch(&conversation.id).await?;

        let keywords = keyword::split(&merged);
        let reply = self.complete_turn(ctx, &conversation.id, &keywords).await?;

        let stored = self
            .messages
            .save(&conversation.id, SenderRole::Assistant, reply.stored_text())
            .await?;

        match reply {
            ParsedReply::Plain(text) => {
                events.push(OutboundEvent::BotReply {
                    content: Some(text),
                    products: None,
                    message_id: stored.id,
                    conversation_id: conversation.id.clone(),
                    user_id: ctx.user_id,
                });
            }
            ParsedReply::Products { products, .. } => {
                self.suggestions
                    .save_all(ctx.user_id, &conversation.id, &stored.id, &products)
                    .await?;
                self.maybe_generate_title(&conversation.id, &keywords).await?;
                events.push(OutboundEvent::BotReply {
                    content: None,
                    products: Some(products),
                    message_id: stored.id,
                    conversation_id: conversation.id.clone(),
                    user_id: ctx.user_id,
                });
            }
        }

        Ok(TurnOutcome {
            conversation_id: conversation.id,
            events,
        })
    }

    /// Ends a conversation explicitly: marks it inactive, records a closing
    /// system message, and gives it a final title.
    pub async fn end_chat(
        &self,
        user_id: i64,
        conversation_id: &str,
    ) -> Result<(), EngineError> {
        let conversation = self
            .conversations
            .get(conversation_id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| EngineError::ConversationNotFound(conversation_id.to_string()))?;

        self.conversations.set_inactive(&conversation.id).await?;
        self.messages
            .save(&conversation.id, SenderRole::System, "Conversation ended.")
            .await?;

        let keywords = conversation.keyword_list();
        let title = self.titles.generate(&keywords).await;
        self.conversations.set_title(&conversation.id, &title).await?;

        info!(conversation_id = %conversation.id, user_id, title = %title, "Chat ended");
        Ok(())
    }

    /// Flips the liked flag for one suggestion tuple. Returns whether a
    /// matching suggestion existed.
    pub async fn toggle_like(
        &self,
        user_id: i64,
        message_id: &str,
        conversation_id: &str,
        product_name: &str,
        liked: bool,
    ) -> Result<bool, EngineError> {
        let matched = self
            .suggestions
            .set_liked(user_id, message_id, conversation_id, product_name, liked)
            .await?;
        if matched {
            info!(user_id, message_id, product_name, liked, "Like toggled");
        } else {
            warn!(user_id, message_id, product_name, "Like toggle matched no suggestion");
        }
        Ok(matched)
    }

    /// Resolves and stores a category for one suggestion. `Ok(None)` when no
    /// path (or no id for the path) could be determined; the suggestion stays
    /// uncategorized.
    pub async fn assign_category(
        &self,
        suggestion_id: &str,
    ) -> Result<Option<i64>, EngineError> {
        let suggestion = self
            .suggestions
            .get(suggestion_id)
            .await?
            .ok_or_else(|| EngineError::SuggestionNotFound(suggestion_id.to_string()))?;

        let path = match self
            .resolver
            .resolve_path(&suggestion.product_name, &suggestion.product_description)
            .await?
        {
            Some(path) => path,
            None => return Ok(None),
        };

        match self.resolver.resolve_category_id(&path).await? {
            Some(category_id) => {
                self.suggestions
                    .assign_category(suggestion_id, category_id)
                    .await?;
                info!(suggestion_id, category_id, path = %path, "Category assigned");
                Ok(Some(category_id))
            }
            None => {
                warn!(suggestion_id, path = %path, "Resolved path has no category id");
                Ok(None)
            }
        }
    }

    /// All conversations for one user, most recently active first.
    pub async fn list_conversations(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConversationRecord>, EngineError> {
        Ok(self.conversations.list_for_user(user_id).await?)
    }

    /// Full message history for one conversation, in send order.
    pub async fn history(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<MessageRecord>, EngineError> {
        Ok(self.messages.history(conversation_id).await?)
    }

    /// Finds the conversation this turn runs in, opening a new one when the
    /// bound conversation is missing, inactive, or expired.
    async fn resolve_conversation(
        &self,
        ctx: &TurnContext,
        events: &mut Vec<OutboundEvent>,
    ) -> Result<ConversationRecord, EngineError> {
        if let Some(id) = &ctx.conversation_id {
            if let Some(existing) = self.conversations.get(id).await? {
                if existing.user_id == ctx.user_id && existing.is_active {
                    if Utc::now() - existing.last_activity_at <= self.idle_timeout {
                        return Ok(existing);
                    }
                    // Stale: retire it and start over with a marker title.
                    self.conversations.set_inactive(&existing.id).await?;
                    events.push(OutboundEvent::info(EXPIRY_NOTICE));
                    info!(conversation_id = %existing.id, "Conversation expired");
                    return self.open_new(ctx.user_id, TIMEOUT_TITLE, events).await;
                }
            }
        }
        self.open_new(ctx.user_id, DEFAULT_TITLE, events).await
    }

    async fn open_new(
        &self,
        user_id: i64,
        placeholder_title: &str,
        events: &mut Vec<OutboundEvent>,
    ) -> Result<ConversationRecord, EngineError> {
        let conversation = self.conversations.create(user_id, placeholder_title).await?;
        events.push(OutboundEvent::ConversationInitialized {
            conversation_id: conversation.id.clone(),
        });
        Ok(conversation)
    }

    /// Builds the prompt from history and asks the collaborator. Collaborator
    /// failure degrades to a fixed fallback reply, never an error.
    async fn complete_turn(
        &self,
        ctx: &TurnContext,
        conversation_id: &str,
        keywords: &[String],
    ) -> Result<ParsedReply, EngineError> {
        let system = recommender_system_prompt(ctx.user_context.as_ref(), keywords);
        let mut messages = vec![ChatMessage::system(system)];

        // The user message was persisted above, so history already ends with
        // the current question.
        for record in self.messages.history(conversation_id).await? {
            match record.sender_role() {
                SenderRole::User => messages.push(ChatMessage::user(record.content)),
                SenderRole::Assistant => messages.push(ChatMessage::assistant(record.content)),
                SenderRole::System => {}
            }
        }

        match self.llm.complete(messages).await {
            Ok(raw) => Ok(parse_reply(&raw)),
            Err(err) => {
                warn!(conversation_id, error = %err, "Assistant call failed; using fallback reply");
                Ok(ParsedReply::Plain(FALLBACK_REPLY.to_string()))
            }
        }
    }

    /// Replaces a still-placeholder title with a generated one. No-op once a
    /// real title is set.
    async fn maybe_generate_title(
        &self,
        conversation_id: &str,
        keywords: &[String],
    ) -> Result<(), EngineError> {
        let conversation = match self.conversations.get(conversation_id).await? {
            Some(c) => c,
            None => return Ok(()),
        };
        if !title::is_placeholder(&conversation.title) {
            return Ok(());
        }
        let generated = self.titles.generate(keywords).await;
        self.conversations
            .set_title(conversation_id, &generated)
            .await?;
        info!(conversation_id, title = %generated, "Conversation titled");
        Ok(())
    }
}
