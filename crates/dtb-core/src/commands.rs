//! Prefix command table and dispatcher.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;

use crate::{
    domain::{GuildId, UserId},
    errors::{Error, ValidationError},
    formatting::{format_todo_list, split_message, EMPTY_LIST},
    messaging::{
        port::{GuildDirectory, MessagingPort},
        types::CommandRequest,
    },
    security::PermissionGuard,
    todo::{parse_task_index, TodoRegistry},
    Result,
};

pub const DENIED: &str = "You do not have permission to use this command.";
pub const FAILURE: &str = "Something went wrong while running that command. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Ping,
    Help,
    TodoView,
    TodoAdd,
    TodoRemove,
    TodoAssign,
}

/// Static descriptor of a command: name, argument requirements, help text.
#[derive(Clone, Copy, Debug)]
pub struct CommandSpec {
    pub name: &'static str,
    pub kind: CommandKind,
    /// Minimum whitespace-separated arguments.
    pub min_args: usize,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "ping",
        kind: CommandKind::Ping,
        min_args: 0,
        usage: "ping",
        summary: "Check that the bot is alive",
    },
    CommandSpec {
        name: "help",
        kind: CommandKind::Help,
        min_args: 0,
        usage: "help",
        summary: "Show this message",
    },
    CommandSpec {
        name: "todoview",
        kind: CommandKind::TodoView,
        min_args: 0,
        usage: "todoview",
        summary: "Show the server's to-do list",
    },
    CommandSpec {
        name: "todo+",
        kind: CommandKind::TodoAdd,
        min_args: 1,
        usage: "todo+ <task text>",
        summary: "Add a task to the end of the list",
    },
    CommandSpec {
        name: "todo-",
        kind: CommandKind::TodoRemove,
        min_args: 1,
        usage: "todo- <task number>",
        summary: "Remove a task by its number in todoview",
    },
    CommandSpec {
        name: "todoassign",
        kind: CommandKind::TodoAssign,
        min_args: 1,
        usage: "todoassign @user",
        summary: "Assign the list to a member",
    },
];

/// Look up a command by exact name.
pub fn resolve(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// A command whose arguments passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Invocation {
    Ping,
    Help,
    View,
    Add(String),
    Remove(Option<i64>),
    Assign(String),
}

fn parse_invocation(
    cmd: &CommandSpec,
    args: &str,
) -> std::result::Result<Invocation, ValidationError> {
    let args = args.trim();
    if args.split_whitespace().count() < cmd.min_args {
        return Err(match cmd.kind {
            CommandKind::TodoAdd => ValidationError::EmptyTask,
            CommandKind::TodoRemove => ValidationError::MissingIndex,
            _ => ValidationError::MissingUser,
        });
    }

    Ok(match cmd.kind {
        CommandKind::Ping => Invocation::Ping,
        CommandKind::Help => Invocation::Help,
        CommandKind::TodoView => Invocation::View,
        CommandKind::TodoAdd => Invocation::Add(args.to_string()),
        CommandKind::TodoRemove => Invocation::Remove(parse_task_index(args)?),
        CommandKind::TodoAssign => Invocation::Assign(args.to_string()),
    })
}

/// `<@123>` / `<@!123>` -> `123`.
fn parse_user_mention(raw: &str) -> Option<UserId> {
    let inner = raw.strip_prefix("<@")?.strip_suffix('>')?;
    let inner = inner.strip_prefix('!').unwrap_or(inner);
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(UserId(inner.to_string()))
}

/// Routes prefix commands to handlers behind the permission guard.
///
/// Stateless between invocations; all shared state lives in the registry.
pub struct Dispatcher {
    registry: Arc<TodoRegistry>,
    guard: PermissionGuard,
    directory: Arc<dyn GuildDirectory>,
    messenger: Arc<dyn MessagingPort>,
    prefix: String,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<TodoRegistry>,
        guard: PermissionGuard,
        directory: Arc<dyn GuildDirectory>,
        messenger: Arc<dyn MessagingPort>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            guard,
            directory,
            messenger,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Run a command and send its reply (if any) to the originating channel.
    pub async fn dispatch(&self, req: CommandRequest) -> Result<()> {
        let Some(reply) = self.reply_for(&req).await else {
            return Ok(());
        };

        let limit = self.messenger.capabilities().max_message_len;
        for chunk in split_message(&reply, limit) {
            self.messenger.send_text(&req.channel_id, &chunk).await?;
        }
        Ok(())
    }

    /// The reply for `req`, or `None` for unknown commands (ignored silently).
    pub async fn reply_for(&self, req: &CommandRequest) -> Option<String> {
        let Some(cmd) = resolve(&req.name) else {
            tracing::debug!(command = %req.name, "ignoring unknown command");
            return None;
        };

        if !self.guard.authorize(&req.actor, cmd.name) {
            tracing::info!(
                command = cmd.name,
                user = %req.actor.user_id,
                username = %req.actor.username,
                guild = %req.guild_id,
                "permission denied"
            );
            return Some(DENIED.to_string());
        }

        let run = AssertUnwindSafe(self.execute(cmd, req)).catch_unwind().await;
        let reply = match run {
            Ok(Ok(text)) => text,
            Ok(Err(Error::Validation(v))) => {
                tracing::debug!(command = cmd.name, error = %v, "invalid command input");
                self.validation_reply(cmd, &v)
            }
            Ok(Err(e)) => {
                tracing::error!(command = cmd.name, guild = %req.guild_id, error = %e, "command failed");
                FAILURE.to_string()
            }
            Err(_) => {
                tracing::error!(command = cmd.name, guild = %req.guild_id, "command handler panicked");
                FAILURE.to_string()
            }
        };
        Some(reply)
    }

    async fn execute(&self, cmd: &CommandSpec, req: &CommandRequest) -> Result<String> {
        let guild = &req.guild_id;

        match parse_invocation(cmd, &req.args)? {
            Invocation::Ping => Ok("Pong!".to_string()),
            Invocation::Help => Ok(self.help_text()),
            Invocation::View => Ok(format_todo_list(&self.registry.view(guild).await)),
            Invocation::Add(text) => {
                let tasks = self.registry.add_task(guild, &text).await?;
                tracing::info!(
                    guild = %guild,
                    user = %req.actor.user_id,
                    username = %req.actor.username,
                    "task added"
                );
                Ok(format!("Added task #{}: {}", tasks.len(), text.trim()))
            }
            Invocation::Remove(index) => {
                let removed = self.registry.remove_task(guild, index).await?;
                tracing::info!(
                    guild = %guild,
                    user = %req.actor.user_id,
                    username = %req.actor.username,
                    "task removed"
                );
                Ok(format!(
                    "Removed task #{}: {removed}",
                    index.unwrap_or_default()
                ))
            }
            Invocation::Assign(raw) => {
                let name = self.resolve_assignee(guild, &raw).await?;
                self.registry.assign(guild, Some(&name)).await?;
                tracing::info!(
                    guild = %guild,
                    user = %req.actor.user_id,
                    username = %req.actor.username,
                    "list assigned"
                );
                Ok(format!("Assigned the to-do list to @{name}."))
            }
        }
    }

    async fn resolve_assignee(&self, guild: &GuildId, raw: &str) -> Result<String> {
        let raw = raw.trim();
        if let Some(user) = parse_user_mention(raw) {
            return self
                .directory
                .display_name(guild, &user)
                .await?
                .ok_or_else(|| ValidationError::UnknownUser(raw.to_string()).into());
        }

        let name = raw.trim_start_matches('@').trim();
        if name.is_empty() {
            return Err(ValidationError::MissingUser.into());
        }
        if name.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidUser(raw.to_string()).into());
        }
        Ok(name.to_string())
    }

    fn validation_reply(&self, cmd: &CommandSpec, err: &ValidationError) -> String {
        match err {
            ValidationError::EmptyList => EMPTY_LIST.to_string(),
            ValidationError::UnknownUser(raw) => {
                format!("I couldn't find {raw} in this server.")
            }
            _ => self.usage_hint(cmd),
        }
    }

    fn usage_hint(&self, cmd: &CommandSpec) -> String {
        let prefix = &self.prefix;
        match cmd.kind {
            CommandKind::TodoRemove => format!(
                "Usage: `{prefix}{}` (see `{prefix}todoview` for the numbers).",
                cmd.usage
            ),
            _ => format!("Usage: `{prefix}{}`", cmd.usage),
        }
    }

    fn help_text(&self) -> String {
        let prefix = &self.prefix;
        let mut lines = vec!["**Commands:**".to_string()];
        lines.extend(
            COMMANDS
                .iter()
                .map(|c| format!("`{prefix}{}` - {}", c.usage, c.summary)),
        );
        lines.push(String::new());
        lines.push(format!(
            "Everything except `{prefix}ping` and `{prefix}help` needs the **{}** role.",
            self.guard.privileged_role()
        ));
        lines.join("\n")
    }
}
