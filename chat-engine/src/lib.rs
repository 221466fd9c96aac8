//! # chat-engine
//!
//! Conversation lifecycle and turn orchestration for the Botify
//! recommendation chat.
//!
//! ## Modules
//!
//! - [`session`] – SessionManager: per-user conversation state machine,
//!   expiry policy, turn pipeline, end-of-chat, like-toggle, category
//!   assignment
//! - [`keyword`] – pure keyword extraction and union merge
//! - [`parser`] – reasoning-block stripping and `<PRODUCT>` extraction
//! - [`title`] – `<TITLE>` parsing, placeholder detection, TitleGenerator
//! - [`category`] – CategoryResolver: iterative per-level tree descent
//! - [`prompts`] – system prompt constants and builders
//!
//! The engine never touches the real-time channel: every operation takes an
//! explicit context and returns the outbound events for the gateway to emit.

pub mod category;
mod error;
pub mod keyword;
pub mod parser;
pub mod prompts;
pub mod session;
pub mod title;

pub use category::CategoryResolver;
pub use error::EngineError;
pub use parser::ParsedReply;
pub use session::{SessionManager, TurnContext, TurnOutcome, UserContext};
pub use title::TitleGenerator;
