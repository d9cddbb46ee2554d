use crate::domain::{Actor, ChannelId, GuildId, UserId};

/// Cross-messenger incoming event model.
///
/// Gateway-specific payloads are converted by the adapter crate.
#[derive(Clone, Debug)]
pub enum IncomingEvent {
    Ready(ReadyInfo),
    MemberJoined(MemberJoin),
    Message(TextMessage),
}

#[derive(Clone, Debug)]
pub struct ReadyInfo {
    pub user_name: String,
    pub user_id: UserId,
}

#[derive(Clone, Debug)]
pub struct MemberJoin {
    pub guild_id: GuildId,
    pub user_id: UserId,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub actor: Actor,
    pub content: String,
}

/// A prefix command ready for the dispatcher.
#[derive(Clone, Debug)]
pub struct CommandRequest {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub actor: Actor,
    pub name: String,
    pub args: String,
}

/// Capabilities / limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}

/// Split `!name rest of line` into `("name", "rest of line")`.
///
/// Returns `None` when `text` does not start with `prefix` or the command name
/// is empty. Names are matched exactly later on, so no case folding here.
pub fn parse_command(prefix: &str, text: &str) -> Option<(String, String)> {
    let body = text.trim_start().strip_prefix(prefix)?;
    let mut parts = body.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }
    let args = parts.next().unwrap_or("").trim().to_string();
    Some((name.to_string(), args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_args() {
        assert_eq!(
            parse_command("!", "!todo+ Buy milk  "),
            Some(("todo+".to_string(), "Buy milk".to_string()))
        );
        assert_eq!(
            parse_command("!", "!todoview"),
            Some(("todoview".to_string(), String::new()))
        );
    }

    #[test]
    fn ignores_non_commands() {
        assert_eq!(parse_command("!", "hello there"), None);
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("!", "! ping"), None);
    }

    #[test]
    fn supports_multi_char_prefix() {
        assert_eq!(
            parse_command("dtb:", "dtb:ping"),
            Some(("ping".to_string(), String::new()))
        );
    }
}
