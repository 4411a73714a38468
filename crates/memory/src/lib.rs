//! Conversation store implementations for paibot.

pub mod in_memory;

pub use in_memory::InMemoryStore;
