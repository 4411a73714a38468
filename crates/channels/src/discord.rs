//! Discord channel adapter.
//!
//! Bridges the serenity gateway into the relay: every message event is
//! converted to an `IncomingMessage` (with the mention flags the relay
//! gates on) and handed to the configured `MessageHandler` together with a
//! `Responder` bound to the originating channel.

use paibot_core::channel::{IncomingMessage, MessageHandler, Responder};
use paibot_core::error::ChannelError;
use paibot_core::message::UserId;
use serenity::all::{
    Client, Context, EventHandler, GatewayIntents, Message as DiscordMessage, Ready,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Discord channel configuration.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Bot token from the Discord Developer Portal.
    pub bot_token: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

/// Discord channel adapter.
pub struct DiscordChannel {
    config: DiscordConfig,
    handler: Arc<dyn MessageHandler>,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig, handler: Arc<dyn MessageHandler>) -> Self {
        Self { config, handler }
    }

    /// Connect to the gateway and process events until it shuts down.
    pub async fn run(&self) -> Result<(), ChannelError> {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = Client::builder(&self.config.bot_token, intents)
            .event_handler(DiscordHandler {
                handler: self.handler.clone(),
            })
            .await
            .map_err(|e| ChannelError::ConnectionLost(e.to_string()))?;

        info!("Starting Discord gateway");
        client
            .start()
            .await
            .map_err(|e| ChannelError::ConnectionLost(e.to_string()))
    }
}

/// Serenity event handler forwarding events to the relay.
struct DiscordHandler {
    handler: Arc<dyn MessageHandler>,
}

#[serenity::async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {}#{} (guilds: {})",
            ready.user.name,
            ready
                .user
                .discriminator
                .map(|d| d.to_string())
                .unwrap_or_default(),
            ready.guilds.len()
        );
    }

    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        let me = ctx.cache.current_user().id;

        let event = IncomingMessage {
            author_id: UserId(msg.author.id.to_string()),
            author_name: Some(msg.author.name.clone()),
            author_is_bot: msg.author.bot,
            mentions_everyone: msg.mention_everyone,
            mentions_me: msg.mentions_user_id(me),
            content: msg.content.clone(),
        };

        debug!(
            author = %event.author_id,
            mentions_me = event.mentions_me,
            "Received discord message"
        );

        let responder = DiscordResponder { ctx, message: msg };
        self.handler.handle(event, &responder).await;
    }
}

/// Reply capability bound to one received Discord message.
struct DiscordResponder {
    ctx: Context,
    message: DiscordMessage,
}

#[async_trait::async_trait]
impl Responder for DiscordResponder {
    async fn send_typing(&self) -> Result<(), ChannelError> {
        self.message
            .channel_id
            .broadcast_typing(&self.ctx.http)
            .await
            .map_err(|e| ChannelError::DeliveryFailed {
                channel: "discord".into(),
                reason: e.to_string(),
            })
    }

    async fn reply(&self, text: &str) -> Result<(), ChannelError> {
        self.message
            .reply(&self.ctx, text)
            .await
            .map(|_| ())
            .map_err(|e| ChannelError::DeliveryFailed {
                channel: "discord".into(),
                reason: e.to_string(),
            })
    }
}
