//! Provider trait — the abstraction over LLM completion backends.
//!
//! A Provider knows how to send a system prompt plus a message list to an
//! LLM and get a complete response back.
//!
//! Implementations: Gemini (native generateContent API), OpenAI-compatible
//! endpoints (Groq and friends).

use crate::error::ProviderError;
use crate::message::Message;
use serde::{Deserialize, Serialize};
use async_trait::async_trait;

/// Configuration for a completion request.
///
/// The system prompt is a dedicated field rather than a message: both wire
/// formats treat it specially (Gemini folds it into the user turn, the
/// OpenAI shape prepends a `system` role message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gemini-2.5-flash", "llama-3.1-8b-instant")
    pub model: String,

    /// The system / persona prompt
    pub system: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

pub fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
///
/// `message.content` may be empty — an empty completion is a degraded
/// success, not an error; the router substitutes a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The completion router calls `complete()` without knowing which backend
/// is being used — pure polymorphism.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "groq").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_defaults() {
        let req = CompletionRequest {
            model: "gemini-2.5-flash".into(),
            system: "You are Paimon".into(),
            messages: vec![Message::user("hello")],
            temperature: default_temperature(),
            max_tokens: None,
        };
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(req.messages.len(), 1);
    }

    #[test]
    fn request_serialization_omits_absent_max_tokens() {
        let req = CompletionRequest {
            model: "m".into(),
            system: "s".into(),
            messages: vec![],
            temperature: 0.7,
            max_tokens: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("max_tokens"));
    }
}
