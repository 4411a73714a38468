//! Chat platform adapters for paibot.
//!
//! Each adapter owns its platform SDK and bridges platform events into
//! `paibot_core::channel::IncomingMessage` events for a `MessageHandler`.
//!
//! Available channels:
//! - **Discord** — serenity WebSocket gateway

pub mod discord;

pub use discord::{DiscordChannel, DiscordConfig};
