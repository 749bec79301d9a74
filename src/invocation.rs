//! Normalized view of one incoming command or component event
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serenity::model::application::interaction::application_command::CommandDataOption;
use serenity::model::channel::{Channel, Message};
use serenity::model::guild::Guild;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, TargetId, UserId};

use crate::author::Author;
use crate::core::{Error, Result};
use crate::gateway::Gateway;
use crate::interaction::Reply;

/// Everything a handler gets to know about the event that triggered it.
///
/// Guild, channel and author are resolved best-effort when the invocation is
/// built; a failed lookup leaves them `None`.
pub struct Invocation {
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub guild: Option<Guild>,
    pub channel: Option<Channel>,
    pub author: Option<Author>,
    /// Selected values of a select menu; empty for everything else
    pub values: Vec<String>,
    /// Targeted user or message of a user/message command
    pub target_id: Option<TargetId>,
    /// Message the used component is attached to
    pub message_id: Option<MessageId>,
    pub(crate) options: Vec<CommandDataOption>,
    pub(crate) gateway: Arc<dyn Gateway>,
    pub(crate) reply: Option<Reply>,
}

impl Invocation {
    pub(crate) fn new(gateway: Arc<dyn Gateway>, channel_id: ChannelId) -> Self {
        Self {
            guild_id: None,
            channel_id,
            guild: None,
            channel: None,
            author: None,
            values: Vec::new(),
            target_id: None,
            message_id: None,
            options: Vec::new(),
            gateway,
            reply: None,
        }
    }

    /// Options in the order the platform sent them
    pub fn options(&self) -> &[CommandDataOption] {
        &self.options
    }

    pub fn get_option(&self, name: &str) -> Option<&CommandDataOption> {
        self.options.iter().find(|option| option.name == name)
    }

    /// Options keyed by name
    pub fn option_map(&self) -> HashMap<&str, &CommandDataOption> {
        self.options
            .iter()
            .map(|option| (option.name.as_str(), option))
            .collect()
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.option_value(name).and_then(|value| value.as_str())
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.option_value(name).and_then(|value| value.as_i64())
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.option_value(name).and_then(|value| value.as_f64())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.option_value(name).and_then(|value| value.as_bool())
    }

    pub fn get_user_id(&self, name: &str) -> Option<UserId> {
        self.snowflake(name).map(UserId)
    }

    pub fn get_channel_id(&self, name: &str) -> Option<ChannelId> {
        self.snowflake(name).map(ChannelId)
    }

    pub fn get_role_id(&self, name: &str) -> Option<RoleId> {
        self.snowflake(name).map(RoleId)
    }

    fn option_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.get_option(name).and_then(|option| option.value.as_ref())
    }

    /// IDs arrive as strings
    fn snowflake(&self, name: &str) -> Option<u64> {
        self.get_string(name).and_then(|id| id.parse().ok())
    }

    /// Author of the targeted user of a user command.
    ///
    /// Inside a guild the target is resolved as a member, otherwise as a bare
    /// user. Client failures are returned unchanged.
    pub async fn target_author(&self) -> Result<Author> {
        let target = self.target_id.ok_or(Error::NoTarget)?;
        let user_id = UserId(target.0);

        match self.guild_id {
            Some(guild_id) => {
                let member = self.gateway.member(guild_id, user_id).await?;
                let guild = match &self.guild {
                    Some(guild) => Some(guild.clone()),
                    None => self.gateway.guild(guild_id).await.ok(),
                };
                Author::from_member(self.gateway.as_ref(), guild_id, guild, member).await
            }
            None => Ok(Author::from_user(self.gateway.user(user_id).await?)),
        }
    }

    /// Targeted message of a message command, fetched from this channel
    pub async fn target_message(&self) -> Result<Message> {
        let target = self.target_id.ok_or(Error::NoTarget)?;
        self.gateway.message(self.channel_id, MessageId(target.0)).await
    }

    /// Hand the gateway to handlers that need lookups of their own
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Remove and return the first option; used to descend into a subcommand
    pub(crate) fn take_first_option(&mut self) -> Option<CommandDataOption> {
        if self.options.is_empty() {
            return None;
        }
        Some(self.options.remove(0))
    }

    pub(crate) fn set_options(&mut self, options: Vec<CommandDataOption>) {
        self.options = options;
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("guild_id", &self.guild_id)
            .field("channel_id", &self.channel_id)
            .field("author", &self.author.as_ref().map(|author| author.id))
            .field("options", &self.options.len())
            .field("values", &self.values)
            .field("target_id", &self.target_id)
            .field("message_id", &self.message_id)
            .field("respondable", &self.reply.is_some())
            .finish()
    }
}
