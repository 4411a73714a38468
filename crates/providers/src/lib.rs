//! LLM provider implementations for paibot.
//!
//! All providers implement the `paibot_core::Provider` trait. The relay
//! routes between a primary and a secondary backend; this crate builds
//! both from configuration.

pub mod gemini;
pub mod openai_compat;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;

use paibot_config::AppConfig;
use paibot_core::error::ProviderError;
use paibot_core::provider::Provider;
use std::sync::Arc;

/// The primary/secondary backend pair the relay routes between.
pub struct BackendSet {
    pub primary: Arc<dyn Provider>,
    pub primary_model: String,
    pub secondary: Arc<dyn Provider>,
    pub secondary_model: String,
}

impl std::fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSet")
            .field("primary", &self.primary.name())
            .field("primary_model", &self.primary_model)
            .field("secondary", &self.secondary.name())
            .field("secondary_model", &self.secondary_model)
            .finish()
    }
}

/// Build both backends from configuration.
///
/// Fails with `NotConfigured` when either API key is absent.
pub fn build_from_config(config: &AppConfig) -> Result<BackendSet, ProviderError> {
    let gemini_key = config
        .gemini
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("gemini.api_key is not set".into()))?;
    let groq_key = config
        .groq
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("groq.api_key is not set".into()))?;

    let mut gemini = GeminiProvider::new(gemini_key);
    if let Some(url) = &config.gemini.api_url {
        gemini = gemini.with_base_url(url);
    }

    let groq = match &config.groq.api_url {
        Some(url) => OpenAiCompatProvider::new("groq", url, groq_key),
        None => OpenAiCompatProvider::groq(groq_key),
    };

    Ok(BackendSet {
        primary: Arc::new(gemini),
        primary_model: config.gemini.model.clone(),
        secondary: Arc::new(groq),
        secondary_model: config.groq.model.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.gemini.api_key = Some("g-key".into());
        config.groq.api_key = Some("q-key".into());
        config
    }

    #[test]
    fn builds_both_backends() {
        let set = build_from_config(&configured()).unwrap();
        assert_eq!(set.primary.name(), "gemini");
        assert_eq!(set.secondary.name(), "groq");
        assert_eq!(set.primary_model, "gemini-2.5-flash");
        assert_eq!(set.secondary_model, "llama-3.1-8b-instant");
    }

    #[test]
    fn missing_gemini_key_is_not_configured() {
        let mut config = configured();
        config.gemini.api_key = None;
        let err = build_from_config(&config).unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn missing_groq_key_is_not_configured() {
        let mut config = configured();
        config.groq.api_key = None;
        let err = build_from_config(&config).unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
