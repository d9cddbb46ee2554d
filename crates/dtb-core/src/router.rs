use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;

use crate::{
    commands::Dispatcher,
    messaging::{
        port::{GuildDirectory, MessagingPort},
        types::{parse_command, CommandRequest, IncomingEvent, MemberJoin, TextMessage},
    },
    Result,
};

/// Entry point for gateway events. Owns no state of its own; every failure is
/// logged here so nothing propagates back into the gateway loop.
pub struct EventRouter {
    dispatcher: Arc<Dispatcher>,
    directory: Arc<dyn GuildDirectory>,
    messenger: Arc<dyn MessagingPort>,
    welcome_channel: String,
}

impl EventRouter {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        directory: Arc<dyn GuildDirectory>,
        messenger: Arc<dyn MessagingPort>,
        welcome_channel: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            directory,
            messenger,
            welcome_channel: welcome_channel.into(),
        }
    }

    pub async fn handle(&self, event: IncomingEvent) {
        match event {
            IncomingEvent::Ready(info) => {
                tracing::info!(user = %info.user_name, id = %info.user_id, "logged in");
            }
            IncomingEvent::MemberJoined(join) => {
                match AssertUnwindSafe(self.welcome(&join)).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(guild = %join.guild_id, error = %e, "welcome message failed");
                    }
                    Err(_) => {
                        tracing::error!(guild = %join.guild_id, "welcome handler panicked");
                    }
                }
            }
            IncomingEvent::Message(msg) => {
                let Some(req) = self.command_from(msg) else {
                    return;
                };
                let (name, guild) = (req.name.clone(), req.guild_id.clone());
                if let Err(e) = self.dispatcher.dispatch(req).await {
                    tracing::warn!(command = %name, guild = %guild, error = %e, "reply failed");
                }
            }
        }
    }

    async fn welcome(&self, join: &MemberJoin) -> Result<()> {
        let Some(channel) = self
            .directory
            .find_text_channel(&join.guild_id, &self.welcome_channel)
            .await?
        else {
            tracing::debug!(
                guild = %join.guild_id,
                channel = %self.welcome_channel,
                "no welcome channel"
            );
            return Ok(());
        };

        let text = format!("Welcome to the server, {}!", join.user_id.mention());
        self.messenger.send_text(&channel, &text).await
    }

    fn command_from(&self, msg: TextMessage) -> Option<CommandRequest> {
        let (name, args) = parse_command(self.dispatcher.prefix(), &msg.content)?;
        let Some(guild_id) = msg.guild_id else {
            tracing::debug!(command = %name, "ignoring command outside a guild");
            return None;
        };

        Some(CommandRequest {
            guild_id,
            channel_id: msg.channel_id,
            actor: msg.actor,
            name,
            args,
        })
    }
}
