//! Seam over the Discord client
//!
//! Everything harmonia asks of the platform besides responding to an
//! interaction goes through [`Gateway`]: entity lookups for building
//! invocations and remote command registration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateApplicationCommand;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::application::command::Command as RegisteredCommand;
use serenity::model::channel::{Channel, Message};
use serenity::model::guild::{Guild, Member, Role};
use serenity::model::id::{ChannelId, CommandId, GuildId, MessageId, RoleId, UserId};
use serenity::model::user::User;
use serenity::prelude::Context;

use crate::core::{Error, Result};

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn guild(&self, guild_id: GuildId) -> Result<Guild>;

    async fn channel(&self, channel_id: ChannelId) -> Result<Channel>;

    async fn member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member>;

    async fn user(&self, user_id: UserId) -> Result<User>;

    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Message>;

    async fn guild_roles(&self, guild_id: GuildId) -> Result<HashMap<RoleId, Role>>;

    /// Create a command globally (`guild_id == None`) or in one guild
    async fn create_command(
        &self,
        guild_id: Option<GuildId>,
        payload: CreateApplicationCommand,
    ) -> Result<RegisteredCommand>;

    /// Commands currently registered remotely, globally or in one guild
    async fn commands(&self, guild_id: Option<GuildId>) -> Result<Vec<RegisteredCommand>>;

    async fn delete_command(&self, guild_id: Option<GuildId>, command_id: CommandId) -> Result<()>;
}

/// [`Gateway`] backed by serenity's cache, falling back to HTTP
#[derive(Clone)]
pub struct SerenityGateway {
    cache: Arc<Cache>,
    http: Arc<Http>,
}

impl SerenityGateway {
    pub fn new(cache: Arc<Cache>, http: Arc<Http>) -> Self {
        Self { cache, http }
    }

    pub fn from_context(ctx: &Context) -> Self {
        Self::new(Arc::clone(&ctx.cache), Arc::clone(&ctx.http))
    }
}

#[async_trait]
impl Gateway for SerenityGateway {
    /// Full guilds only exist in the cache; HTTP returns partial guilds
    async fn guild(&self, guild_id: GuildId) -> Result<Guild> {
        self.cache.guild(guild_id).ok_or(Error::NotCached("guild"))
    }

    async fn channel(&self, channel_id: ChannelId) -> Result<Channel> {
        if let Some(channel) = self.cache.channel(channel_id) {
            return Ok(channel);
        }
        Ok(self.http.get_channel(channel_id.0).await?)
    }

    async fn member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member> {
        if let Some(member) = self.cache.member(guild_id, user_id) {
            return Ok(member);
        }
        Ok(self.http.get_member(guild_id.0, user_id.0).await?)
    }

    async fn user(&self, user_id: UserId) -> Result<User> {
        if let Some(user) = self.cache.user(user_id) {
            return Ok(user);
        }
        Ok(self.http.get_user(user_id.0).await?)
    }

    async fn message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<Message> {
        if let Some(message) = self.cache.message(channel_id, message_id) {
            return Ok(message);
        }
        Ok(self.http.get_message(channel_id.0, message_id.0).await?)
    }

    async fn guild_roles(&self, guild_id: GuildId) -> Result<HashMap<RoleId, Role>> {
        if let Some(roles) = self.cache.guild_roles(guild_id) {
            return Ok(roles);
        }
        let roles = self.http.get_guild_roles(guild_id.0).await?;
        Ok(roles.into_iter().map(|role| (role.id, role)).collect())
    }

    async fn create_command(
        &self,
        guild_id: Option<GuildId>,
        payload: CreateApplicationCommand,
    ) -> Result<RegisteredCommand> {
        let registered = match guild_id {
            Some(guild_id) => {
                guild_id
                    .create_application_command(&self.http, |command| {
                        *command = payload;
                        command
                    })
                    .await?
            }
            None => {
                RegisteredCommand::create_global_application_command(&self.http, |command| {
                    *command = payload;
                    command
                })
                .await?
            }
        };
        Ok(registered)
    }

    async fn commands(&self, guild_id: Option<GuildId>) -> Result<Vec<RegisteredCommand>> {
        let commands = match guild_id {
            Some(guild_id) => guild_id.get_application_commands(&self.http).await?,
            None => RegisteredCommand::get_global_application_commands(&self.http).await?,
        };
        Ok(commands)
    }

    async fn delete_command(&self, guild_id: Option<GuildId>, command_id: CommandId) -> Result<()> {
        match guild_id {
            Some(guild_id) => guild_id.delete_application_command(&self.http, command_id).await?,
            None => RegisteredCommand::delete_global_application_command(&self.http, command_id).await?,
        }
        Ok(())
    }
}
