//! `paibot run` — connect to Discord and relay completions.

use paibot_agent::ChatRelay;
use paibot_channels::{DiscordChannel, DiscordConfig};
use paibot_config::AppConfig;
use paibot_memory::InMemoryStore;
use std::sync::Arc;
use tracing::info;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let token = config.discord.token.clone().ok_or(
        "No Discord token configured — set DISCORD_TOKEN or discord.token in config.toml",
    )?;

    let backends = paibot_providers::build_from_config(&config)?;
    info!(
        primary = %backends.primary_model,
        secondary = %backends.secondary_model,
        "Completion backends ready"
    );

    let store = Arc::new(InMemoryStore::new());
    let relay = Arc::new(ChatRelay::new(
        backends.primary,
        backends.primary_model,
        backends.secondary,
        backends.secondary_model,
        store,
    ));

    let channel = DiscordChannel::new(DiscordConfig { bot_token: token }, relay);
    channel.run().await?;

    Ok(())
}
