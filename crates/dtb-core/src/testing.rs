//! In-memory port implementations for unit tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    domain::{ChannelId, GuildId, UserId},
    errors::Error,
    messaging::{
        port::{GuildDirectory, MessagingPort},
        types::MessagingCapabilities,
    },
    Result,
};

#[derive(Default)]
pub struct FakeMessenger {
    sends: Mutex<Vec<(String, String)>>,
}

impl FakeMessenger {
    /// `(channel id, text)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 2000,
        }
    }

    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<()> {
        self.sends
            .lock()
            .unwrap()
            .push((channel.0.clone(), text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    // (guild, channel name) -> channel id
    channels: HashMap<(String, String), String>,
    // (guild, user id) -> display name
    members: HashMap<(String, String), String>,
}

impl FakeDirectory {
    pub fn with_channel(mut self, guild: &str, name: &str, id: &str) -> Self {
        self.channels
            .insert((guild.to_string(), name.to_string()), id.to_string());
        self
    }

    pub fn with_member(mut self, guild: &str, user: &str, name: &str) -> Self {
        self.members
            .insert((guild.to_string(), user.to_string()), name.to_string());
        self
    }
}

#[async_trait]
impl GuildDirectory for FakeDirectory {
    async fn find_text_channel(&self, guild: &GuildId, name: &str) -> Result<Option<ChannelId>> {
        Ok(self
            .channels
            .get(&(guild.0.clone(), name.to_string()))
            .cloned()
            .map(ChannelId))
    }

    async fn display_name(&self, guild: &GuildId, user: &UserId) -> Result<Option<String>> {
        Ok(self.members.get(&(guild.0.clone(), user.0.clone())).cloned())
    }
}

/// Directory whose member lookup panics, for exercising the dispatcher boundary.
pub struct PanickingDirectory;

#[async_trait]
impl GuildDirectory for PanickingDirectory {
    async fn find_text_channel(&self, _guild: &GuildId, _name: &str) -> Result<Option<ChannelId>> {
        panic!("channel lookup exploded");
    }

    async fn display_name(&self, _guild: &GuildId, _user: &UserId) -> Result<Option<String>> {
        panic!("member lookup exploded");
    }
}

/// Messenger whose sends always fail. Attempts are still recorded.
#[derive(Default)]
pub struct FailingMessenger {
    attempts: Mutex<Vec<(String, String)>>,
}

impl FailingMessenger {
    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FailingMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 2000,
        }
    }

    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<()> {
        self.attempts
            .lock()
            .unwrap()
            .push((channel.0.clone(), text.to_string()));
        Err(Error::External("discord is down".to_string()))
    }
}
