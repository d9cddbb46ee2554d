//! Discord adapter (serenity).
//!
//! This crate implements the `dtb-core` ports over the Discord HTTP API and
//! feeds gateway events into the core event router.

use std::sync::Arc;

use async_trait::async_trait;

use serenity::{
    all::{ChannelType, CreateAllowedMentions, CreateMessage, Http},
    http::HttpError,
};

pub mod router;

use dtb_core::{
    domain::{ChannelId, GuildId, UserId},
    errors::Error,
    messaging::{
        port::{GuildDirectory, MessagingPort},
        types::MessagingCapabilities,
    },
    Result,
};

/// Discord's hard limit for message content.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::External(format!("discord error: {e}"))
    }
}

/// Parse a snowflake id; zero is not a valid id.
pub fn snowflake(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| Error::External(format!("invalid discord id: {raw:?}")))
}

fn dc_guild(guild: &GuildId) -> Result<serenity::all::GuildId> {
    Ok(serenity::all::GuildId::new(snowflake(&guild.0)?))
}

fn dc_channel(channel: &ChannelId) -> Result<serenity::all::ChannelId> {
    Ok(serenity::all::ChannelId::new(snowflake(&channel.0)?))
}

fn dc_user(user: &UserId) -> Result<serenity::all::UserId> {
    Ok(serenity::all::UserId::new(snowflake(&user.0)?))
}

fn is_not_found(e: &serenity::Error) -> bool {
    matches!(
        e,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 404
    )
}

#[async_trait]
impl MessagingPort for DiscordGateway {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: DISCORD_MESSAGE_LIMIT,
        }
    }

    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<()> {
        // Task text is user input: never let it ping @everyone or roles.
        let mentions = CreateAllowedMentions::new().all_users(true);
        let msg = CreateMessage::new().content(text).allowed_mentions(mentions);

        dc_channel(channel)?
            .send_message(&self.http, msg)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

#[async_trait]
impl GuildDirectory for DiscordGateway {
    async fn find_text_channel(&self, guild: &GuildId, name: &str) -> Result<Option<ChannelId>> {
        let channels = dc_guild(guild)?
            .channels(&self.http)
            .await
            .map_err(Self::map_err)?;

        Ok(channels
            .into_values()
            .filter(|c| c.kind == ChannelType::Text && c.name == name)
            .min_by_key(|c| c.position)
            .map(|c| ChannelId(c.id.get().to_string())))
    }

    async fn display_name(&self, guild: &GuildId, user: &UserId) -> Result<Option<String>> {
        match dc_guild(guild)?.member(&self.http, dc_user(user)?).await {
            Ok(member) => Ok(Some(member.display_name().to_string())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(Self::map_err(e)),
        }
    }
}
