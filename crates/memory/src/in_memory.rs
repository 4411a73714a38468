//! In-memory conversation store — the only backend; conversation state is
//! deliberately ephemeral and does not survive a restart.

use paibot_core::memory::{ConversationStore, HISTORY_LIMIT};
use paibot_core::message::{Message, UserId};
use std::collections::{HashMap, VecDeque};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Per-user state: the bounded rolling log and the last-reply slot.
#[derive(Default)]
struct UserConversation {
    history: VecDeque<Message>,
    last_reply: Option<String>,
}

impl UserConversation {
    fn push_bounded(&mut self, message: Message) {
        self.history.push_back(message);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

/// Keyed in-memory store behind a `RwLock`.
///
/// Each call is atomic, but two in-flight turns from the same user can
/// interleave between calls: both may read the same pre-update history and
/// both may write the last-reply slot, with the later write winning.
/// Last-write-wins is accepted semantics here, not a bug.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, UserConversation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn append_user_message(&self, user: &UserId, text: &str) {
        let mut users = self.users.write().await;
        users
            .entry(user.clone())
            .or_default()
            .push_bounded(Message::user(text));
    }

    async fn append_assistant_message(&self, user: &UserId, text: &str) {
        let mut users = self.users.write().await;
        let conversation = users.entry(user.clone()).or_default();
        conversation.push_bounded(Message::assistant(text));
        conversation.last_reply = Some(text.to_string());
    }

    async fn history(&self, user: &UserId) -> Vec<Message> {
        let users = self.users.read().await;
        users
            .get(user)
            .map(|c| c.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn last_reply(&self, user: &UserId) -> Option<String> {
        let users = self.users.read().await;
        users.get(user).and_then(|c| c.last_reply.clone())
    }
}
