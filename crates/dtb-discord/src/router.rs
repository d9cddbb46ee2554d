use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use serenity::all::{
    Context, EventHandler, GatewayIntents, Http, Member, Message, Ready, RoleId,
};

use dtb_core::{
    commands::Dispatcher,
    config::Config,
    domain::{Actor, ChannelId, GuildId, UserId},
    messaging::{
        port::{GuildDirectory, MessagingPort},
        types::{IncomingEvent, MemberJoin, ReadyInfo, TextMessage},
    },
    router::EventRouter,
    security::PermissionGuard,
    todo::TodoRegistry,
};

use crate::DiscordGateway;

/// Gateway intents the bot needs: guild metadata, member joins, and the
/// content of guild messages (for prefix commands).
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

struct Handler {
    router: Arc<EventRouter>,
    prefix: String,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.router
            .handle(IncomingEvent::Ready(ReadyInfo {
                user_name: ready.user.name.clone(),
                user_id: UserId(ready.user.id.get().to_string()),
            }))
            .await;
    }

    async fn guild_member_addition(&self, _ctx: Context, new_member: Member) {
        self.router
            .handle(IncomingEvent::MemberJoined(MemberJoin {
                guild_id: GuildId(new_member.guild_id.get().to_string()),
                user_id: UserId(new_member.user.id.get().to_string()),
            }))
            .await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        // Role lookups cost HTTP calls; only pay for them on prefix commands.
        if !is_command_shaped(&self.prefix, &msg.content) {
            return;
        }

        let roles = match msg.guild_id {
            Some(guild) => member_role_names(&ctx.http, guild, &msg).await,
            None => Vec::new(),
        };

        let event = IncomingEvent::Message(TextMessage {
            guild_id: msg.guild_id.map(|g| GuildId(g.get().to_string())),
            channel_id: ChannelId(msg.channel_id.get().to_string()),
            actor: Actor {
                user_id: UserId(msg.author.id.get().to_string()),
                username: msg.author.name.clone(),
                roles,
            },
            content: msg.content,
        });
        self.router.handle(event).await;
    }
}

fn is_command_shaped(prefix: &str, content: &str) -> bool {
    content.trim_start().starts_with(prefix)
}

/// Names of the roles the author of `msg` holds in `guild`.
///
/// Lookup failures are logged and yield no roles, which the guard treats as
/// "not privileged".
async fn member_role_names(
    http: &Arc<Http>,
    guild: serenity::all::GuildId,
    msg: &Message,
) -> Vec<String> {
    let role_ids: Vec<RoleId> = match &msg.member {
        Some(member) => member.roles.clone(),
        None => match guild.member(http, msg.author.id).await {
            Ok(member) => member.roles,
            Err(e) => {
                tracing::warn!(guild = %guild, user = %msg.author.id, error = %e, "member lookup failed");
                return Vec::new();
            }
        },
    };
    if role_ids.is_empty() {
        return Vec::new();
    }

    match guild.roles(http).await {
        Ok(all) => role_ids
            .iter()
            .filter_map(|id| all.get(id))
            .map(|role| role.name.clone())
            .collect(),
        Err(e) => {
            tracing::warn!(guild = %guild, error = %e, "role lookup failed");
            Vec::new()
        }
    }
}

/// Connect to the Discord gateway and serve events until the client stops.
pub async fn run_gateway(cfg: Arc<Config>, registry: Arc<TodoRegistry>) -> anyhow::Result<()> {
    let http = Arc::new(Http::new(&cfg.discord_token));
    let gateway = Arc::new(DiscordGateway::new(http));
    let messenger: Arc<dyn MessagingPort> = gateway.clone();
    let directory: Arc<dyn GuildDirectory> = gateway;

    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        PermissionGuard::new(cfg.privileged_role.clone()),
        directory.clone(),
        messenger.clone(),
        cfg.command_prefix.clone(),
    ));
    let router = Arc::new(EventRouter::new(
        dispatcher,
        directory,
        messenger,
        cfg.welcome_channel.clone(),
    ));

    tracing::info!(
        prefix = %cfg.command_prefix,
        privileged_role = %cfg.privileged_role,
        welcome_channel = %cfg.welcome_channel,
        "starting discord gateway"
    );

    let handler = Handler {
        router,
        prefix: cfg.command_prefix.clone(),
    };
    let mut client = serenity::Client::builder(&cfg.discord_token, intents())
        .event_handler(handler)
        .await
        .context("failed to build Discord gateway client")?;

    client
        .start()
        .await
        .context("Discord gateway client stopped unexpectedly")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_shape_check_matches_prefix_only() {
        assert!(is_command_shaped("!", "!todoview"));
        assert!(is_command_shaped("!", "  !ping"));
        assert!(!is_command_shaped("!", "hello!"));
        assert!(!is_command_shaped("?", "!ping"));
    }

    #[test]
    fn intents_include_members_and_message_content() {
        let i = intents();
        assert!(i.contains(GatewayIntents::GUILD_MEMBERS));
        assert!(i.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(i.contains(GatewayIntents::GUILD_MESSAGES));
    }
}
