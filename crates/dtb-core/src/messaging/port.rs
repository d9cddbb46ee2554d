use async_trait::async_trait;

use crate::{
    domain::{ChannelId, GuildId, UserId},
    messaging::types::MessagingCapabilities,
    Result,
};

/// Outbound messaging port.
///
/// Discord is the first implementation; the core only ever sends plain text to
/// a channel and never sees SDK types.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<()>;
}

/// Read-only guild lookups the core needs from the gateway.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    /// Find a text channel in `guild` by exact name.
    async fn find_text_channel(&self, guild: &GuildId, name: &str) -> Result<Option<ChannelId>>;

    /// Display name of a guild member, `None` if they are not in the guild.
    async fn display_name(&self, guild: &GuildId, user: &UserId) -> Result<Option<String>>;
}
