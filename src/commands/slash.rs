//! # Slash Commands (/)
//!
//! Leaf chat input commands: a handler plus zero or more typed options.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 3.0.0: Builder API, options attached per command
//! - 2.0.0: Consolidate subcommands into GroupSlashCommand
//! - 1.0.0: Reorganized from monolithic slash_commands.rs

use std::future::Future;
use std::sync::Arc;

use log::warn;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::{Command as RegisteredCommand, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;

use super::handler::{command_fn, launch, Command, CommandFunc, CommandKind, CommandMeta};
use super::option::CommandOption;
use crate::harmonia::Harmonia;
use crate::invocation::Invocation;

/// A slash command bound directly to a handler
pub struct SlashCommand {
    meta: CommandMeta,
    options: Vec<CommandOption>,
    command_func: Option<CommandFunc>,
}

impl SlashCommand {
    /// Panics if `name` is empty or not a valid chat input name
    pub fn new(name: &str) -> Self {
        Self {
            meta: CommandMeta::chat_input(name),
            options: Vec::new(),
            command_func: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = description.into();
        self
    }

    /// Register for one guild instead of globally
    pub fn with_guild_id(mut self, guild_id: impl Into<Option<GuildId>>) -> Self {
        self.meta.guild_id = guild_id.into();
        self
    }

    pub fn with_dm_permission(mut self, is_allowed: bool) -> Self {
        self.meta.dm_permission = is_allowed;
        self
    }

    pub fn with_default_permissions(mut self, permissions: Permissions) -> Self {
        self.meta.default_permissions = Some(permissions);
        self
    }

    /// Append options; panics if an option name is already taken
    pub fn with_options(mut self, options: impl IntoIterator<Item = CommandOption>) -> Self {
        for option in options {
            if self.options.iter().any(|o| o.name() == option.name()) {
                panic!("duplicate option name '{}' on command '{}'", option.name(), self.meta.name);
            }
            self.options.push(option);
        }
        self
    }

    /// Bind the handler run on every invocation
    pub fn with_command<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<Harmonia>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.command_func = Some(command_fn(f));
        self
    }

    pub fn description(&self) -> &str {
        &self.meta.description
    }

    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }
}

impl Command for SlashCommand {
    fn name(&self) -> &str {
        &self.meta.name
    }

    fn kind(&self) -> CommandKind {
        CommandKind::ChatInput
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.meta.guild_id
    }

    fn execute(&self, harmonia: Arc<Harmonia>, invocation: Invocation) {
        match &self.command_func {
            Some(func) => launch(self.meta.name.clone(), Arc::clone(func), harmonia, invocation),
            None => warn!("Slash command '{}' has no handler bound", self.meta.name),
        }
    }

    fn create_payload(&self) -> CreateApplicationCommand {
        let mut command = CreateApplicationCommand::default();
        self.meta.apply(CommandKind::ChatInput, &mut command);
        for option in &self.options {
            command.add_option(option.create_payload());
        }
        command
    }

    fn create_subcommand_option(&self) -> Option<CreateApplicationCommandOption> {
        let mut option = CreateApplicationCommandOption::default();
        option
            .name(&self.meta.name)
            .description(&self.meta.description)
            .kind(CommandOptionType::SubCommand);
        for sub_option in &self.options {
            option.add_sub_option(sub_option.create_payload());
        }
        Some(option)
    }

    fn registration(&self) -> Option<&RegisteredCommand> {
        self.meta.registration()
    }

    fn set_registration(&self, registration: RegisteredCommand) {
        self.meta.set_registration(registration);
    }
}
