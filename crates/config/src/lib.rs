//! Configuration loading, validation, and management for paibot.
//!
//! Loads configuration from `~/.paibot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.paibot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Discord gateway credentials
    #[serde(default)]
    pub discord: DiscordSettings,

    /// Primary completion backend (Gemini)
    #[serde(default)]
    pub gemini: BackendSettings,

    /// Secondary / fallback completion backend (Groq)
    #[serde(default)]
    pub groq: BackendSettings,
}

/// Discord connection settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DiscordSettings {
    /// Bot token from the Discord Developer Portal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Settings for one completion backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the API base URL (proxies, test servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model name; each backend gets its own default
    #[serde(default)]
    pub model: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            model: String::new(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_groq_model() -> String {
    "llama-3.1-8b-instant".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("discord", &self.discord)
            .field("gemini", &self.gemini)
            .field("groq", &self.groq)
            .finish()
    }
}

impl std::fmt::Debug for DiscordSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSettings")
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.paibot/config.toml).
    ///
    /// Environment variables override file values:
    /// - `DISCORD_TOKEN`
    /// - `GEMINI_API_KEY`, `GROQ_API_KEY`
    /// - `PAIBOT_GEMINI_MODEL`, `PAIBOT_GROQ_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            config.discord.token = Some(token);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            config.groq.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("PAIBOT_GEMINI_MODEL") {
            config.gemini.model = model;
        }
        if let Ok(model) = std::env::var("PAIBOT_GROQ_MODEL") {
            config.groq.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Empty model fields fall back to the per-backend defaults
        if config.gemini.model.is_empty() {
            config.gemini.model = default_gemini_model();
        }
        if config.groq.model.is_empty() {
            config.groq.model = default_groq_model();
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".paibot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.model.is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must not be empty".into(),
            ));
        }
        if self.groq.model.is_empty() {
            return Err(ConfigError::ValidationError(
                "groq.model must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether both backend keys are available (from config or environment).
    pub fn has_backend_keys(&self) -> bool {
        self.gemini.api_key.is_some() && self.groq.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            discord: DiscordSettings::default(),
            gemini: BackendSettings {
                model: default_gemini_model(),
                ..BackendSettings::default()
            },
            groq: BackendSettings {
                model: default_groq_model(),
                ..BackendSettings::default()
            },
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
