//! Conversation store trait — per-user bounded short-term memory.
//!
//! The store owns two pieces of per-user state:
//! - a rolling message log bounded at [`HISTORY_LIMIT`] entries (oldest
//!   evicted first), and
//! - a last-reply cache holding the most recent assistant text (overwritten
//!   on every successful reply, no expiry).
//!
//! State is created lazily on a user's first message and lives for the
//! process lifetime. The user *set* grows without bound while per-user
//! state stays bounded — a deliberate resource-accounting tradeoff.

use crate::message::{Message, UserId};
use async_trait::async_trait;

/// Maximum messages retained per user.
pub const HISTORY_LIMIT: usize = 10;

/// The conversation store contract.
///
/// All operations are infallible: the store is pure in-memory mutation
/// with no I/O. Implementations: in-memory (the only backend; persistence
/// across restarts is out of scope).
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a user message, creating the history if absent and evicting
    /// from the front until the bound holds.
    async fn append_user_message(&self, user: &UserId, text: &str);

    /// Append an assistant message with the same bound discipline, and set
    /// the user's last-reply cache to `text`.
    async fn append_assistant_message(&self, user: &UserId, text: &str);

    /// Ordered snapshot of the user's history (empty if none exists).
    async fn history(&self, user: &UserId) -> Vec<Message>;

    /// The cached most recent assistant reply, if any.
    async fn last_reply(&self, user: &UserId) -> Option<String>;
}
