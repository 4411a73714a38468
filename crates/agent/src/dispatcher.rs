//! Reply dispatcher — the last stage of a turn.
//!
//! Clips the reply to the platform ceiling, records it as an assistant
//! message (which also refreshes the last-reply cache), and sends it. No
//! retries; a send failure propagates to the relay's top-level catch.

use paibot_core::channel::{clip, Responder, MAX_MESSAGE_CHARS};
use paibot_core::error::ChannelError;
use paibot_core::memory::ConversationStore;
use paibot_core::message::UserId;
use std::sync::Arc;

pub struct ReplyDispatcher {
    store: Arc<dyn ConversationStore>,
}

impl ReplyDispatcher {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Record and deliver one reply.
    pub async fn dispatch(
        &self,
        user: &UserId,
        text: &str,
        responder: &dyn Responder,
    ) -> Result<(), ChannelError> {
        let text = clip(text, MAX_MESSAGE_CHARS);
        self.store.append_assistant_message(user, text).await;
        responder.reply(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paibot_memory::InMemoryStore;
    use std::sync::Mutex;

    struct RecordingResponder {
        replies: Mutex<Vec<String>>,
        fail_sends: bool,
    }

    impl RecordingResponder {
        fn new() -> Self {
            Self {
                replies: Mutex::new(Vec::new()),
                fail_sends: false,
            }
        }

        fn failing() -> Self {
            Self {
                replies: Mutex::new(Vec::new()),
                fail_sends: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl Responder for RecordingResponder {
        async fn send_typing(&self) -> Result<(), ChannelError> {
            Ok(())
        }

        async fn reply(&self, text: &str) -> Result<(), ChannelError> {
            if self.fail_sends {
                return Err(ChannelError::DeliveryFailed {
                    channel: "mock".into(),
                    reason: "send refused".into(),
                });
            }
            self.replies.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn user() -> UserId {
        UserId::from("user-1")
    }

    #[tokio::test]
    async fn dispatch_records_then_sends() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = ReplyDispatcher::new(store.clone());
        let responder = RecordingResponder::new();

        dispatcher.dispatch(&user(), "Hi~!", &responder).await.unwrap();

        assert_eq!(responder.replies.lock().unwrap().as_slice(), ["Hi~!"]);
        assert_eq!(store.last_reply(&user()).await.as_deref(), Some("Hi~!"));
        let history = store.history(&user()).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "Hi~!");
    }

    #[tokio::test]
    async fn dispatch_clips_oversize_replies() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = ReplyDispatcher::new(store.clone());
        let responder = RecordingResponder::new();

        let long: String = "b".repeat(3000);
        dispatcher.dispatch(&user(), &long, &responder).await.unwrap();

        let sent = responder.replies.lock().unwrap()[0].clone();
        assert_eq!(sent.chars().count(), MAX_MESSAGE_CHARS);
        assert!(long.starts_with(&sent));
        // The store holds the clipped text too
        assert_eq!(store.last_reply(&user()).await.unwrap(), sent);
    }

    #[tokio::test]
    async fn send_failure_propagates() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = ReplyDispatcher::new(store.clone());
        let responder = RecordingResponder::failing();

        let result = dispatcher.dispatch(&user(), "Hi~!", &responder).await;
        assert!(matches!(
            result.unwrap_err(),
            ChannelError::DeliveryFailed { .. }
        ));
    }
}
