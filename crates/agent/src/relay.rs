//! The chat relay — per-event orchestration behind the channel seam.
//!
//! One event is processed start-to-finish inside `handle`, but the runtime
//! may dispatch further events while a completion call is in flight, so two
//! near-simultaneous messages from the same user can interleave (the store
//! documents the resulting last-write-wins semantics).

use crate::dispatcher::ReplyDispatcher;
use crate::router::CompletionRouter;
use paibot_core::channel::{IncomingMessage, MessageHandler, Responder};
use paibot_core::intent::{classify, Mode};
use paibot_core::memory::ConversationStore;
use paibot_core::message::UserId;
use paibot_core::persona;
use paibot_core::provider::Provider;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// The relay: gate → record → classify → route → dispatch, with the
/// top-level apology catch.
pub struct ChatRelay {
    store: Arc<dyn ConversationStore>,
    router: CompletionRouter,
    dispatcher: ReplyDispatcher,
}

impl ChatRelay {
    pub fn new(
        primary: Arc<dyn Provider>,
        primary_model: impl Into<String>,
        secondary: Arc<dyn Provider>,
        secondary_model: impl Into<String>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        let router = CompletionRouter::new(
            primary,
            primary_model,
            secondary,
            secondary_model,
            store.clone(),
        );
        let dispatcher = ReplyDispatcher::new(store.clone());
        Self {
            store,
            router,
            dispatcher,
        }
    }

    async fn take_turn(
        &self,
        user: &UserId,
        mode: Mode,
        text: &str,
        responder: &dyn Responder,
    ) -> paibot_core::Result<()> {
        let reply = self.router.route(user, mode, text).await?;
        self.dispatcher.dispatch(user, &reply, responder).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for ChatRelay {
    async fn handle(&self, event: IncomingMessage, responder: &dyn Responder) {
        // Only direct mentions from humans are processed; everything else
        // is dropped without touching any state.
        if event.author_is_bot || event.mentions_everyone || !event.mentions_me {
            return;
        }

        let user = event.author_id.clone();
        info!(user = %user, content_len = event.content.len(), "Handling mention");

        self.store.append_user_message(&user, &event.content).await;

        // Presence cue before the (slow) completion call; best-effort
        if let Err(e) = responder.send_typing().await {
            debug!(user = %user, error = %e, "Typing cue failed");
        }

        let mode = classify(&event.content);

        if let Err(e) = self.take_turn(&user, mode, &event.content, responder).await {
            error!(user = %user, error = %e, "Turn failed, replying with the apology line");
            if let Err(send_err) = responder.reply(persona::CONFUSED_APOLOGY).await {
                warn!(user = %user, error = %send_err, "Failed to deliver the apology reply");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paibot_core::error::{ChannelError, ProviderError};
    use paibot_core::message::{Message, Role};
    use paibot_core::provider::{CompletionRequest, CompletionResponse};
    use paibot_memory::InMemoryStore;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockProvider {
        name: String,
        script: Mutex<VecDeque<Result<String, ProviderError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockProvider {
        fn new(name: &str) -> Self {
            Self {
                name: name.into(),
                script: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn replies(self, text: &str) -> Self {
            self.script.lock().unwrap().push_back(Ok(text.to_string()));
            self
        }

        fn fails(self, error: ProviderError) -> Self {
            self.script.lock().unwrap().push_back(Err(error));
            self
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> CompletionRequest {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            let result = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock provider called more times than scripted");
            result.map(|text| CompletionResponse {
                message: Message::assistant(text),
                usage: None,
                model: request.model,
            })
        }
    }

    #[derive(Default)]
    struct RecordingResponder {
        replies: Mutex<Vec<String>>,
        typing_count: AtomicUsize,
    }

    #[async_trait]
    impl Responder for RecordingResponder {
        async fn send_typing(&self) -> Result<(), ChannelError> {
            self.typing_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn reply(&self, text: &str) -> Result<(), ChannelError> {
            self.replies.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn mention(content: &str) -> IncomingMessage {
        IncomingMessage {
            author_id: UserId::from("user-1"),
            author_name: Some("Traveler".into()),
            author_is_bot: false,
            mentions_everyone: false,
            mentions_me: true,
            content: content.into(),
        }
    }

    fn relay(
        primary: Arc<MockProvider>,
        secondary: Arc<MockProvider>,
        store: Arc<InMemoryStore>,
    ) -> ChatRelay {
        ChatRelay::new(
            primary,
            "gemini-2.5-flash",
            secondary,
            "llama-3.1-8b-instant",
            store,
        )
    }

    #[tokio::test]
    async fn hello_turn_end_to_end() {
        let primary = Arc::new(MockProvider::new("gemini").replies("Hi~!"));
        let secondary = Arc::new(MockProvider::new("groq"));
        let store = Arc::new(InMemoryStore::new());
        let responder = RecordingResponder::default();

        relay(primary.clone(), secondary.clone(), store.clone())
            .handle(mention("hello"), &responder)
            .await;

        assert_eq!(responder.replies.lock().unwrap().as_slice(), ["Hi~!"]);
        assert_eq!(responder.typing_count.load(Ordering::SeqCst), 1);

        let user = UserId::from("user-1");
        let history = store.history(&user).await;
        assert_eq!(history.len(), 2);
        assert_eq!((history[0].role, history[0].content.as_str()), (Role::User, "hello"));
        assert_eq!((history[1].role, history[1].content.as_str()), (Role::Assistant, "Hi~!"));
        assert_eq!(store.last_reply(&user).await.as_deref(), Some("Hi~!"));

        // Primary got the persona one-shot
        let request = primary.request(0);
        assert!(request.system.contains("Paimon"));
        assert_eq!(request.messages.len(), 1);
    }

    #[tokio::test]
    async fn bot_authors_are_ignored() {
        let primary = Arc::new(MockProvider::new("gemini"));
        let secondary = Arc::new(MockProvider::new("groq"));
        let store = Arc::new(InMemoryStore::new());
        let responder = RecordingResponder::default();

        let mut event = mention("hello");
        event.author_is_bot = true;
        relay(primary.clone(), secondary.clone(), store.clone())
            .handle(event, &responder)
            .await;

        assert_eq!(primary.calls(), 0);
        assert_eq!(secondary.calls(), 0);
        assert!(responder.replies.lock().unwrap().is_empty());
        assert_eq!(responder.typing_count.load(Ordering::SeqCst), 0);
        assert!(store.history(&UserId::from("user-1")).await.is_empty());
    }

    #[tokio::test]
    async fn everyone_mentions_are_ignored() {
        let primary = Arc::new(MockProvider::new("gemini"));
        let secondary = Arc::new(MockProvider::new("groq"));
        let store = Arc::new(InMemoryStore::new());
        let responder = RecordingResponder::default();

        let mut event = mention("hello @everyone");
        event.mentions_everyone = true;
        relay(primary.clone(), secondary.clone(), store.clone())
            .handle(event, &responder)
            .await;

        assert_eq!(primary.calls(), 0);
        assert!(responder.replies.lock().unwrap().is_empty());
        assert!(store.history(&UserId::from("user-1")).await.is_empty());
    }

    #[tokio::test]
    async fn unmentioned_messages_are_ignored() {
        let primary = Arc::new(MockProvider::new("gemini"));
        let secondary = Arc::new(MockProvider::new("groq"));
        let store = Arc::new(InMemoryStore::new());
        let responder = RecordingResponder::default();

        let mut event = mention("just chatting");
        event.mentions_me = false;
        relay(primary.clone(), secondary.clone(), store.clone())
            .handle(event, &responder)
            .await;

        assert_eq!(primary.calls(), 0);
        assert!(responder.replies.lock().unwrap().is_empty());
        assert!(store.history(&UserId::from("user-1")).await.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_sends_the_apology() {
        let primary = Arc::new(MockProvider::new("gemini").fails(ProviderError::ApiError {
            status_code: 500,
            message: "boom".into(),
        }));
        let secondary = Arc::new(MockProvider::new("groq"));
        let store = Arc::new(InMemoryStore::new());
        let responder = RecordingResponder::default();

        relay(primary, secondary, store.clone())
            .handle(mention("hello"), &responder)
            .await;

        assert_eq!(
            responder.replies.lock().unwrap().as_slice(),
            [persona::CONFUSED_APOLOGY]
        );

        // The apology is not recorded as an assistant turn
        let user = UserId::from("user-1");
        assert_eq!(store.history(&user).await.len(), 1);
        assert!(store.last_reply(&user).await.is_none());
    }

    #[tokio::test]
    async fn correction_turn_after_a_normal_turn() {
        let primary = Arc::new(MockProvider::new("gemini").replies("Tokyo is in Kansai"));
        let secondary =
            Arc::new(MockProvider::new("groq").replies("Ugh, fine! Paimon was wrong this time..."));
        let store = Arc::new(InMemoryStore::new());
        let responder = RecordingResponder::default();
        let relay = relay(primary.clone(), secondary.clone(), store.clone());

        relay.handle(mention("where is Tokyo?"), &responder).await;
        relay.handle(mention("mali ka"), &responder).await;

        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert!(secondary.request(0).system.contains("Tokyo is in Kansai"));

        let replies = responder.replies.lock().unwrap();
        assert_eq!(replies.len(), 2);
        assert!(replies[1].contains("Paimon was wrong"));

        let user = UserId::from("user-1");
        assert_eq!(
            store.last_reply(&user).await.as_deref(),
            Some("Ugh, fine! Paimon was wrong this time...")
        );
    }

    #[tokio::test]
    async fn quota_fallback_sees_the_current_message() {
        let primary = Arc::new(
            MockProvider::new("gemini").fails(ProviderError::RateLimited { retry_after_secs: 5 }),
        );
        let secondary = Arc::new(MockProvider::new("groq").replies("Paimon forgot nothing!"));
        let store = Arc::new(InMemoryStore::new());
        let responder = RecordingResponder::default();

        relay(primary, secondary.clone(), store)
            .handle(mention("hello"), &responder)
            .await;

        assert_eq!(
            responder.replies.lock().unwrap().as_slice(),
            ["Paimon forgot nothing!"]
        );

        // The history handed to the fallback includes the turn's own message
        let request = secondary.request(0);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "hello");
    }
}
