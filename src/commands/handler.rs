//! Command trait shared by every command variant
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: One trait for chat, group, user and message commands; handlers are stored closures
//! - 1.0.0: Initial implementation for modular command handling

use std::future::Future;
use std::sync::{Arc, OnceLock};

use futures::future::BoxFuture;
use log::error;
use regex::Regex;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::{Command as RegisteredCommand, CommandType};
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;

use crate::harmonia::Harmonia;
use crate::invocation::Invocation;

/// Longest name the platform accepts, in characters
pub const MAX_NAME_LENGTH: usize = 32;

static CHAT_INPUT_NAME: OnceLock<Regex> = OnceLock::new();

fn chat_input_name() -> &'static Regex {
    CHAT_INPUT_NAME.get_or_init(|| {
        Regex::new(r"^[-_\p{L}\p{N}]{1,32}$").expect("chat input name pattern is valid")
    })
}

/// Whether `name` is accepted as a chat input (slash) command or subcommand name
pub fn is_valid_chat_input_name(name: &str) -> bool {
    chat_input_name().is_match(name)
}

/// A stored handler: receives the owning [`Harmonia`] and the invocation.
///
/// Errors are logged by the task that runs the handler and go nowhere else.
pub type CommandFunc =
    Arc<dyn Fn(Arc<Harmonia>, Invocation) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Box an async closure into a [`CommandFunc`]
pub fn command_fn<F, Fut>(f: F) -> CommandFunc
where
    F: Fn(Arc<Harmonia>, Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |harmonia, invocation| Box::pin(f(harmonia, invocation)))
}

/// Run a handler as a detached task. The dispatcher never waits for it.
pub(crate) fn launch(label: String, func: CommandFunc, harmonia: Arc<Harmonia>, invocation: Invocation) {
    tokio::spawn(async move {
        if let Err(e) = func(harmonia, invocation).await {
            error!("Handler for '{label}' failed: {e:#}");
        }
    });
}

/// Which surface a command is registered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    ChatInput,
    User,
    Message,
}

impl CommandKind {
    pub fn as_command_type(self) -> CommandType {
        match self {
            CommandKind::ChatInput => CommandType::ChatInput,
            CommandKind::User => CommandType::User,
            CommandKind::Message => CommandType::Message,
        }
    }
}

/// Capabilities every command variant exposes to the registry and dispatcher
///
/// Implemented by [`SlashCommand`](super::SlashCommand),
/// [`GroupSlashCommand`](super::GroupSlashCommand),
/// [`UserCommand`](super::UserCommand) and [`MessageCommand`](super::MessageCommand).
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> CommandKind;

    /// Groups hold subcommands instead of a handler
    fn is_group(&self) -> bool {
        false
    }

    /// Guild the command is registered in, `None` for global
    fn guild_id(&self) -> Option<GuildId>;

    /// Launch the bound handler without blocking the caller
    fn execute(&self, harmonia: Arc<Harmonia>, invocation: Invocation);

    /// Payload sent when registering the command remotely
    fn create_payload(&self) -> CreateApplicationCommand;

    /// Payload used when this command is nested under a group.
    ///
    /// `None` for commands that cannot be nested (user and message commands).
    fn create_subcommand_option(&self) -> Option<CreateApplicationCommandOption> {
        None
    }

    /// Registration returned by the platform, once registered
    fn registration(&self) -> Option<&RegisteredCommand>;

    fn set_registration(&self, registration: RegisteredCommand);
}

/// Metadata shared by all command variants
#[derive(Debug, Default)]
pub(crate) struct CommandMeta {
    pub name: String,
    pub description: String,
    pub guild_id: Option<GuildId>,
    pub dm_permission: bool,
    pub default_permissions: Option<Permissions>,
    registration: OnceLock<RegisteredCommand>,
}

impl CommandMeta {
    /// Panics on names the platform would reject for chat input commands
    pub fn chat_input(name: &str) -> Self {
        if name.is_empty() {
            panic!("empty command name");
        }
        if !is_valid_chat_input_name(name) {
            panic!("command name '{name}' does not match the CHAT_INPUT naming pattern");
        }
        Self::unchecked(name)
    }

    /// Panics on empty or overlong context menu names
    pub fn context_menu(name: &str) -> Self {
        if name.is_empty() {
            panic!("empty command name");
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            panic!("command name '{name}' is longer than {MAX_NAME_LENGTH} characters");
        }
        Self::unchecked(name)
    }

    fn unchecked(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn registration(&self) -> Option<&RegisteredCommand> {
        self.registration.get()
    }

    /// First registration wins; a command is registered once per process
    pub fn set_registration(&self, registration: RegisteredCommand) {
        let _ = self.registration.set(registration);
    }

    /// Fill the fields common to every payload
    pub fn apply(&self, kind: CommandKind, command: &mut CreateApplicationCommand) {
        command
            .name(&self.name)
            .kind(kind.as_command_type())
            .dm_permission(self.dm_permission);
        if kind == CommandKind::ChatInput {
            command.description(&self.description);
        }
        if let Some(permissions) = self.default_permissions {
            command.default_member_permissions(permissions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_chat_input_names() {
        for name in ["ping", "set_user", "add-role", "números", "a", "x".repeat(32).as_str()] {
            assert!(is_valid_chat_input_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_chat_input_names() {
        for name in ["", "with space", "bang!", "x".repeat(33).as_str(), "slash/command"] {
            assert!(!is_valid_chat_input_name(name), "{name} should be invalid");
        }
    }

    #[test]
    #[should_panic(expected = "empty command name")]
    fn test_empty_chat_input_name_panics() {
        CommandMeta::chat_input("");
    }

    #[test]
    #[should_panic(expected = "CHAT_INPUT")]
    fn test_malformed_chat_input_name_panics() {
        CommandMeta::chat_input("Analyze User");
    }

    #[test]
    fn test_context_menu_allows_spaces() {
        let meta = CommandMeta::context_menu("Analyze User");
        assert_eq!(meta.name, "Analyze User");
    }

    #[test]
    #[should_panic(expected = "longer than")]
    fn test_context_menu_length_limit() {
        CommandMeta::context_menu(&"x".repeat(33));
    }

    #[test]
    fn test_apply_skips_description_for_context_menus() {
        let mut meta = CommandMeta::context_menu("Inspect");
        meta.description = "ignored".to_string();
        let mut payload = CreateApplicationCommand::default();
        meta.apply(CommandKind::User, &mut payload);

        assert_eq!(payload.0.get("name").unwrap().as_str(), Some("Inspect"));
        assert_eq!(payload.0.get("type").unwrap().as_u64(), Some(2));
        assert!(payload.0.get("description").is_none());
        assert!(payload.0.get("default_member_permissions").is_none());
    }
}
