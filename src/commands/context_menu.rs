//! Context menu commands: User and Message
//!
//! Registered without options. The targeted user or message is resolved at
//! invocation time, see [`Invocation::target_author`] and
//! [`Invocation::target_message`].
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 2.0.0: Split into UserCommand and MessageCommand builders
//! - 1.0.0: Initial implementation

use std::future::Future;
use std::sync::Arc;

use log::warn;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command as RegisteredCommand;
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;

use super::handler::{command_fn, launch, Command, CommandFunc, CommandKind, CommandMeta};
use crate::harmonia::Harmonia;
use crate::invocation::Invocation;

struct TargetCommand {
    meta: CommandMeta,
    kind: CommandKind,
    command_func: Option<CommandFunc>,
}

impl TargetCommand {
    fn new(name: &str, kind: CommandKind) -> Self {
        Self {
            meta: CommandMeta::context_menu(name),
            kind,
            command_func: None,
        }
    }

    fn execute(&self, harmonia: Arc<Harmonia>, invocation: Invocation) {
        match &self.command_func {
            Some(func) => launch(self.meta.name.clone(), Arc::clone(func), harmonia, invocation),
            None => warn!("Context menu command '{}' has no handler bound", self.meta.name),
        }
    }

    fn create_payload(&self) -> CreateApplicationCommand {
        let mut command = CreateApplicationCommand::default();
        self.meta.apply(self.kind, &mut command);
        command
    }
}

/// A command shown in the "Apps" menu of a user
pub struct UserCommand(TargetCommand);

/// A command shown in the "Apps" menu of a message
pub struct MessageCommand(TargetCommand);

impl UserCommand {
    /// Panics if `name` is empty or longer than 32 characters
    pub fn new(name: &str) -> Self {
        Self(TargetCommand::new(name, CommandKind::User))
    }
}

impl MessageCommand {
    /// Panics if `name` is empty or longer than 32 characters
    pub fn new(name: &str) -> Self {
        Self(TargetCommand::new(name, CommandKind::Message))
    }
}

macro_rules! target_command_builders {
    ($ty:ident) => {
        impl $ty {
            pub fn with_guild_id(mut self, guild_id: impl Into<Option<GuildId>>) -> Self {
                self.0.meta.guild_id = guild_id.into();
                self
            }

            pub fn with_dm_permission(mut self, is_allowed: bool) -> Self {
                self.0.meta.dm_permission = is_allowed;
                self
            }

            pub fn with_default_permissions(mut self, permissions: Permissions) -> Self {
                self.0.meta.default_permissions = Some(permissions);
                self
            }

            /// Bind the handler run on every invocation
            pub fn with_command<F, Fut>(mut self, f: F) -> Self
            where
                F: Fn(Arc<Harmonia>, Invocation) -> Fut + Send + Sync + 'static,
                Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
            {
                self.0.command_func = Some(command_fn(f));
                self
            }
        }

        impl Command for $ty {
            fn name(&self) -> &str {
                &self.0.meta.name
            }

            fn kind(&self) -> CommandKind {
                self.0.kind
            }

            fn guild_id(&self) -> Option<GuildId> {
                self.0.meta.guild_id
            }

            fn execute(&self, harmonia: Arc<Harmonia>, invocation: Invocation) {
                self.0.execute(harmonia, invocation);
            }

            fn create_payload(&self) -> CreateApplicationCommand {
                self.0.create_payload()
            }

            fn registration(&self) -> Option<&RegisteredCommand> {
                self.0.meta.registration()
            }

            fn set_registration(&self, registration: RegisteredCommand) {
                self.0.meta.set_registration(registration);
            }
        }
    };
}

target_command_builders!(UserCommand);
target_command_builders!(MessageCommand);
