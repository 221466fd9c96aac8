//! # botify-core
//!
//! Core types for the Botify recommendation chat: [`SenderRole`], the outbound
//! event variants the engine hands to the real-time channel, and tracing
//! initialization. Transport-agnostic; used by storage, chat-engine and the
//! gateway.

pub mod events;
pub mod logger;
pub mod types;

pub use events::{OutboundEvent, ProductPayload};
pub use logger::init_tracing;
pub use types::SenderRole;
