//! Channel seams — the boundary between the chat platform and the relay.
//!
//! The platform SDK (serenity for Discord) lives in the channels crate and
//! is treated as an external collaborator: it delivers `IncomingMessage`
//! events to a `MessageHandler` and accepts replies through a `Responder`.

use crate::error::ChannelError;
use crate::message::UserId;
use async_trait::async_trait;

/// The platform ceiling for a single outbound message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Clip `text` to at most `max_chars` characters.
///
/// The limit counts characters, not bytes: Discord's ceiling is measured in
/// characters, and a byte slice could split a code point.
pub fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// A message event delivered by the chat platform.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform-specific author ID, the key for all per-user state
    pub author_id: UserId,

    /// Human-readable author name (if available)
    pub author_name: Option<String>,

    /// Whether the author is a bot account (including ourselves)
    pub author_is_bot: bool,

    /// Whether the message mentions @everyone / @here
    pub mentions_everyone: bool,

    /// Whether the message mentions the bot user directly
    pub mentions_me: bool,

    /// The raw text content
    pub content: String,
}

/// Reply capability for a single incoming message.
///
/// Wraps whatever the platform needs to address the originating
/// conversation (channel handle, message reference).
#[async_trait]
pub trait Responder: Send + Sync {
    /// Best-effort presence cue; callers treat failures as non-fatal.
    async fn send_typing(&self) -> std::result::Result<(), ChannelError>;

    /// Send `text` as a reply to the originating message.
    async fn reply(&self, text: &str) -> std::result::Result<(), ChannelError>;
}

/// The relay's entry point, invoked by a channel adapter for every event.
///
/// Implementations own their error handling: `handle` is infallible from
/// the adapter's point of view so a bad turn can never take the gateway
/// down.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, event: IncomingMessage, responder: &dyn Responder);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_short_text_unchanged() {
        assert_eq!(clip("hello", MAX_MESSAGE_CHARS), "hello");
    }

    #[test]
    fn clip_long_text_to_exact_char_count() {
        let long: String = "a".repeat(2500);
        let clipped = clip(&long, MAX_MESSAGE_CHARS);
        assert_eq!(clipped.chars().count(), 2000);
        assert!(long.starts_with(clipped));
    }

    #[test]
    fn clip_counts_characters_not_bytes() {
        // é is two bytes in UTF-8; clipping at 3 chars must not split it
        let text = "ééééé";
        let clipped = clip(text, 3);
        assert_eq!(clipped, "ééé");
        assert_eq!(clipped.chars().count(), 3);
    }

    #[test]
    fn clip_exact_boundary() {
        let text: String = "x".repeat(2000);
        assert_eq!(clip(&text, 2000), text);
    }

    #[test]
    fn incoming_message_construction() {
        let msg = IncomingMessage {
            author_id: UserId::from("42"),
            author_name: Some("Traveler".into()),
            author_is_bot: false,
            mentions_everyone: false,
            mentions_me: true,
            content: "hello @paibot".into(),
        };
        assert_eq!(msg.author_id.0, "42");
        assert!(msg.mentions_me);
    }
}
