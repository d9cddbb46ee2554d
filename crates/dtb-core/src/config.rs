use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,

    /// Role required for every command except `ping` and `help`.
    pub privileged_role: String,
    pub command_prefix: String,

    /// Text channel that receives the welcome message on member join.
    pub welcome_channel: String,

    pub todo_data_file: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in
    /// `load`, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN").unwrap_or_default();
        if discord_token.trim().is_empty() {
            return Err(Error::Config(
                "DISCORD_TOKEN environment variable is required".to_string(),
            ));
        }

        let privileged_role = lookup("PRIVILEGED_ROLE").unwrap_or_else(|| "Admin".to_string());
        if privileged_role.trim().is_empty() {
            return Err(Error::Config("PRIVILEGED_ROLE must not be blank".to_string()));
        }

        let command_prefix = lookup("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string());
        if command_prefix.trim().is_empty() {
            return Err(Error::Config("COMMAND_PREFIX must not be blank".to_string()));
        }

        let welcome_channel = lookup("WELCOME_CHANNEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "general".to_string());

        let todo_data_file = PathBuf::from(
            lookup("TODO_DATA_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| "todo_data.json".to_string()),
        );
        let log_file = lookup("DTB_LOG_FILE").and_then(non_empty).map(PathBuf::from);

        Ok(Self {
            discord_token: discord_token.trim().to_string(),
            privileged_role: privileged_role.trim().to_string(),
            command_prefix: command_prefix.trim().to_string(),
            welcome_channel,
            todo_data_file,
            log_file,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "   ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(cfg.discord_token, "abc");
        assert_eq!(cfg.privileged_role, "Admin");
        assert_eq!(cfg.command_prefix, "!");
        assert_eq!(cfg.welcome_channel, "general");
        assert_eq!(cfg.todo_data_file, PathBuf::from("todo_data.json"));
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn overrides_apply() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("PRIVILEGED_ROLE", " Task Master "),
            ("COMMAND_PREFIX", "?"),
            ("WELCOME_CHANNEL", "lobby"),
            ("TODO_DATA_FILE", "/var/lib/dtb/todo.json"),
            ("DTB_LOG_FILE", "discord.log"),
        ]))
        .unwrap();
        assert_eq!(cfg.privileged_role, "Task Master");
        assert_eq!(cfg.command_prefix, "?");
        assert_eq!(cfg.welcome_channel, "lobby");
        assert_eq!(cfg.todo_data_file, PathBuf::from("/var/lib/dtb/todo.json"));
        assert_eq!(cfg.log_file, Some(PathBuf::from("discord.log")));
    }

    #[test]
    fn blank_role_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("PRIVILEGED_ROLE", ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn dotenv_parsing_strips_quotes_and_comments() {
        let parsed = parse_dotenv(
            "# comment\nDISCORD_TOKEN=\"secret\"\n\nexport PRIVILEGED_ROLE='Mods'\nbroken line\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("DISCORD_TOKEN".to_string(), "secret".to_string()),
                ("PRIVILEGED_ROLE".to_string(), "Mods".to_string()),
            ]
        );
    }
}
