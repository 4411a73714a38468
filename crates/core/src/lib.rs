//! # Paibot Core
//!
//! Domain types, traits, and error definitions for the paibot chat relay.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod channel;
pub mod error;
pub mod intent;
pub mod memory;
pub mod message;
pub mod persona;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use channel::{IncomingMessage, MessageHandler, Responder, MAX_MESSAGE_CHARS};
pub use error::{ChannelError, Error, ProviderError, Result};
pub use intent::{classify, Mode};
pub use memory::{ConversationStore, HISTORY_LIMIT};
pub use message::{Message, Role, UserId};
pub use provider::{CompletionRequest, CompletionResponse, Provider, Usage};
