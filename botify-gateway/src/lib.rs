//! # botify-gateway
//!
//! Real-time channel boundary for the Botify recommendation chat: an axum
//! WebSocket endpoint that validates tagged client events, drives the chat
//! engine, and streams tagged server events back.

pub mod cli;
pub mod config;
pub mod events;
pub mod ws;

pub use cli::{load_config, Cli, Commands};
pub use config::GatewayConfig;
pub use events::ClientEvent;
pub use ws::{router, GatewayState};
