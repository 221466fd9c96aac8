//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an OpenAI-compatible implementation.
//! Transport-agnostic; the chat engine holds an `Arc<dyn LlmClient>` so tests
//! can script the collaborator.
//!
//! The collaborator is treated as fallible and latency-bound: every request
//! in the OpenAI implementation runs under an enforced timeout, and elapse is
//! reported as an ordinary [`LlmError`] so callers fall back instead of
//! hanging a session.

use async_trait::async_trait;
use thiserror::Error;

mod openai;

pub use openai::{mask_token, OpenAiLlmClient, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Role of a message, one-to-one with Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message, one element of the completion request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Errors from the LLM collaborator. Callers treat every variant the same
/// way: log and fall back, never propagate to the client.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("LLM returned no completion")]
    EmptyResponse,
}

/// LLM client interface: one text completion from an ordered list of
/// role-tagged messages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}
