//! Completion router — mode selection and provider failover.
//!
//! Three paths through a turn:
//! - **Correction** (correction mode + a cached last reply): the secondary
//!   backend answers under the correction prompt, seeing only the current
//!   message. The primary is never consulted.
//! - **TryPrimary**: the primary backend answers one-shot (persona + the
//!   current message, no history).
//! - **FallbackSecondary**: entered only when the primary fails with the
//!   quota classification; the secondary answers with the user's entire
//!   rolling history. Any other primary error propagates untouched.
//!
//! Every path clips its result to the platform ceiling and substitutes a
//! branch-specific placeholder for an empty completion.

use paibot_core::channel::{clip, MAX_MESSAGE_CHARS};
use paibot_core::error::ProviderError;
use paibot_core::intent::Mode;
use paibot_core::memory::ConversationStore;
use paibot_core::message::{Message, UserId};
use paibot_core::persona;
use paibot_core::provider::{default_temperature, CompletionRequest, Provider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes one turn to the right backend and normalizes the result text.
pub struct CompletionRouter {
    primary: Arc<dyn Provider>,
    primary_model: String,
    secondary: Arc<dyn Provider>,
    secondary_model: String,
    store: Arc<dyn ConversationStore>,
}

impl CompletionRouter {
    pub fn new(
        primary: Arc<dyn Provider>,
        primary_model: impl Into<String>,
        secondary: Arc<dyn Provider>,
        secondary_model: impl Into<String>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            primary,
            primary_model: primary_model.into(),
            secondary,
            secondary_model: secondary_model.into(),
            store,
        }
    }

    /// Produce the reply text for one turn.
    ///
    /// `text` is the raw current message; the user's message is expected to
    /// already be in the store so the fallback path sees it in the history.
    pub async fn route(
        &self,
        user: &UserId,
        mode: Mode,
        text: &str,
    ) -> Result<String, ProviderError> {
        if mode == Mode::Correction {
            if let Some(prev_reply) = self.store.last_reply(user).await {
                return self.correct(&prev_reply, text).await;
            }
            // Nothing cached to dispute; the turn degrades to a normal one.
            debug!(user = %user, "Correction requested without a cached reply");
        }

        self.answer(user, text).await
    }

    /// Correction branch: secondary backend, correction prompt, current
    /// message only.
    async fn correct(&self, prev_reply: &str, text: &str) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: self.secondary_model.clone(),
            system: persona::correction_prompt(prev_reply),
            messages: vec![Message::user(text)],
            temperature: default_temperature(),
            max_tokens: None,
        };

        let response = self.secondary.complete(request).await?;
        Ok(finalize(
            response.message.content,
            persona::CORRECTION_PLACEHOLDER,
        ))
    }

    /// Normal branch: primary one-shot, secondary-with-history on quota.
    async fn answer(&self, user: &UserId, text: &str) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: self.primary_model.clone(),
            system: persona::NORMAL_PROMPT.into(),
            messages: vec![Message::user(text)],
            temperature: default_temperature(),
            max_tokens: None,
        };

        match self.primary.complete(request).await {
            Ok(response) => {
                return Ok(finalize(
                    response.message.content,
                    persona::SPEECHLESS_PLACEHOLDER,
                ));
            }
            Err(ProviderError::RateLimited { .. }) => {
                warn!(
                    primary = %self.primary.name(),
                    secondary = %self.secondary.name(),
                    "Primary quota exhausted, switching to fallback"
                );
            }
            // Only quota exhaustion triggers the fallback hop
            Err(other) => return Err(other),
        }

        let history = self.store.history(user).await;
        let request = CompletionRequest {
            model: self.secondary_model.clone(),
            system: persona::NORMAL_PROMPT.into(),
            messages: history,
            temperature: default_temperature(),
            max_tokens: None,
        };

        let response = self.secondary.complete(request).await?;
        Ok(finalize(response.message.content, persona::FORGOT_PLACEHOLDER))
    }
}

/// Clip to the platform ceiling, then substitute the placeholder if nothing
/// usable remains.
fn finalize(text: String, placeholder: &str) -> String {
    let clipped = clip(&text, MAX_MESSAGE_CHARS);
    if clipped.is_empty() {
        placeholder.to_string()
    } else {
        clipped.to_string()
    }
}
