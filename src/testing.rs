//! In-memory gateway and model fixtures for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command as RegisteredCommand;
use serenity::model::application::interaction::application_command::CommandDataOption;
use serenity::model::channel::{Channel, Message};
use serenity::model::guild::{Guild, Member, Role};
use serenity::model::id::{ChannelId, CommandId, GuildId, MessageId, RoleId, UserId};
use serenity::model::user::User;

use crate::core::{Error, Result};
use crate::gateway::Gateway;

fn not_found() -> Error {
    Error::Discord(serenity::Error::Other("not found"))
}

/// Records remote calls; lookups succeed only for what was put in
#[derive(Default)]
pub(crate) struct FakeGateway {
    users: HashMap<UserId, User>,
    members: HashMap<(GuildId, UserId), Member>,
    roles: HashMap<RoleId, Role>,
    fail_roles: bool,
    /// Command name whose creation fails
    fail_create: Option<String>,
    /// Command ID whose deletion fails
    fail_delete: Option<CommandId>,
    pub created: Mutex<Vec<(Option<GuildId>, String)>>,
    pub deleted: Mutex<Vec<(Option<GuildId>, CommandId)>>,
    registered: Mutex<Vec<RegisteredCommand>>,
    guild_lookups: AtomicUsize,
    next_id: AtomicU64,
}

impl FakeGateway {
    pub fn failing_roles() -> Self {
        Self {
            fail_roles: true,
            ..Self::default()
        }
    }

    pub fn with_fail_create(mut self, name: &str) -> Self {
        self.fail_create = Some(name.to_string());
        self
    }

    pub fn with_fail_delete(mut self, command_id: CommandId) -> Self {
        self.fail_delete = Some(command_id);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.id, role);
        self
    }

    pub fn guild_lookups(&self) -> usize {
        self.guild_lookups.load(Ordering::SeqCst)
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id, user);
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.insert((member.guild_id, member.user.id), member);
        self
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn deleted_ids(&self) -> Vec<CommandId> {
        self.deleted.lock().unwrap().iter().map(|(_, id)| *id).collect()
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn guild(&self, _guild_id: GuildId) -> Result<Guild> {
        self.guild_lookups.fetch_add(1, Ordering::SeqCst);
        Err(Error::NotCached("guild"))
    }

    async fn channel(&self, _channel_id: ChannelId) -> Result<Channel> {
        Err(not_found())
    }

    async fn member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member> {
        self.members.get(&(guild_id, user_id)).cloned().ok_or_else(not_found)
    }

    async fn user(&self, user_id: UserId) -> Result<User> {
        self.users.get(&user_id).cloned().ok_or_else(not_found)
    }

    async fn message(&self, _channel_id: ChannelId, _message_id: MessageId) -> Result<Message> {
        Err(not_found())
    }

    async fn guild_roles(&self, _guild_id: GuildId) -> Result<HashMap<RoleId, Role>> {
        if self.fail_roles {
            return Err(not_found());
        }
        Ok(self.roles.clone())
    }

    async fn create_command(
        &self,
        guild_id: Option<GuildId>,
        payload: CreateApplicationCommand,
    ) -> Result<RegisteredCommand> {
        let name = payload.0.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        if self.fail_create.as_deref() == Some(name.as_str()) {
            return Err(Error::Discord(serenity::Error::Other("create rejected")));
        }

        let kind = payload.0.get("type").and_then(Value::as_u64).unwrap_or(1);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.created.lock().unwrap().push((guild_id, name.clone()));
        let registered = registered_command(id, &name, kind, guild_id);
        self.registered.lock().unwrap().push(registered.clone());
        Ok(registered)
    }

    async fn commands(&self, guild_id: Option<GuildId>) -> Result<Vec<RegisteredCommand>> {
        Ok(self
            .registered
            .lock()
            .unwrap()
            .iter()
            .filter(|command| command.guild_id == guild_id)
            .cloned()
            .collect())
    }

    async fn delete_command(&self, guild_id: Option<GuildId>, command_id: CommandId) -> Result<()> {
        if self.fail_delete == Some(command_id) {
            return Err(Error::Discord(serenity::Error::Other("delete rejected")));
        }
        self.deleted.lock().unwrap().push((guild_id, command_id));
        self.registered.lock().unwrap().retain(|command| command.id != command_id);
        Ok(())
    }
}

pub(crate) fn registered_command(id: u64, name: &str, kind: u64, guild_id: Option<GuildId>) -> RegisteredCommand {
    serde_json::from_value(json!({
        "id": id.to_string(),
        "application_id": "1",
        "type": kind,
        "guild_id": guild_id.map(|id| id.0.to_string()),
        "name": name,
        "description": "",
        "options": [],
        "default_member_permissions": null,
        "dm_permission": false,
        "default_permission": true,
        "version": "1",
    }))
    .unwrap()
}

pub(crate) fn test_role(guild_id: u64, id: u64, name: &str) -> Role {
    serde_json::from_value(json!({
        "id": id.to_string(),
        "guild_id": guild_id.to_string(),
        "name": name,
        "color": 0,
        "hoist": false,
        "managed": false,
        "mentionable": false,
        "permissions": "0",
        "position": 1,
        "icon": null,
        "unicode_emoji": null,
    }))
    .unwrap()
}

pub(crate) fn test_user(id: u64, name: &str) -> User {
    serde_json::from_value(json!({
        "id": id.to_string(),
        "username": name,
        "discriminator": "0001",
        "avatar": null,
        "bot": false,
    }))
    .unwrap()
}

pub(crate) fn test_member(guild_id: u64, user_id: u64, name: &str, nick: Option<&str>, roles: &[u64]) -> Member {
    let roles: Vec<String> = roles.iter().map(u64::to_string).collect();
    serde_json::from_value(json!({
        "guild_id": guild_id.to_string(),
        "user": {
            "id": user_id.to_string(),
            "username": name,
            "discriminator": "0001",
            "avatar": null,
            "bot": false,
        },
        "nick": nick,
        "roles": roles,
        "joined_at": "2021-06-01T12:00:00.000000+00:00",
        "premium_since": null,
        "deaf": false,
        "mute": false,
        "pending": false,
        "avatar": null,
        "communication_disabled_until": null,
    }))
    .unwrap()
}

/// Option as the platform sends it; `kind` is the numeric option type
pub(crate) fn option(name: &str, kind: u8, value: Value) -> CommandDataOption {
    serde_json::from_value(json!({
        "name": name,
        "type": kind,
        "value": value,
        "options": [],
        "focused": false,
    }))
    .unwrap()
}

/// Subcommand (type 1) or subcommand group (type 2) option wrapping `options`
pub(crate) fn nested_option(name: &str, kind: u8, options: Vec<CommandDataOption>) -> CommandDataOption {
    let mut nested: CommandDataOption = serde_json::from_value(json!({
        "name": name,
        "type": kind,
        "options": [],
        "focused": false,
    }))
    .unwrap();
    nested.options = options;
    nested
}
