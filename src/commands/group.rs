//! Slash commands with subcommands
//!
//! A group holds no handler of its own. At invocation time the first option
//! names the subcommand, and that option's nested options are handed on.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use serenity::builder::{CreateApplicationCommand, CreateApplicationCommandOption};
use serenity::model::application::command::{Command as RegisteredCommand, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;

use super::handler::{Command, CommandKind, CommandMeta};
use crate::core::{Error, Result};
use crate::harmonia::Harmonia;
use crate::invocation::Invocation;

/// A slash command whose invocations are routed to named subcommands
pub struct GroupSlashCommand {
    meta: CommandMeta,
    subcommands: BTreeMap<String, Arc<dyn Command>>,
}

impl GroupSlashCommand {
    /// Panics if `name` is empty or not a valid chat input name
    pub fn new(name: &str) -> Self {
        Self {
            meta: CommandMeta::chat_input(name),
            subcommands: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = description.into();
        self
    }

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

    /// Add subcommands or nested groups.
    ///
    /// Panics on a duplicate name or on a user/message command, see
    /// [`add_subcommand`](Self::add_subcommand) for the fallible form.
    pub fn with_subcommands<I>(mut self, subcommands: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Command>>,
    {
        for subcommand in subcommands {
            if let Err(e) = self.add_subcommand(subcommand) {
                panic!("{e}");
            }
        }
        self
    }

    /// Add one subcommand or nested group
    pub fn add_subcommand(&mut self, subcommand: Arc<dyn Command>) -> Result<()> {
        let name = subcommand.name().to_string();

        if subcommand.kind() != CommandKind::ChatInput {
            return Err(Error::NotChatInput(name));
        }

        if self.subcommands.contains_key(&name) {
            return Err(Error::DuplicateSubcommand(name));
        }

        self.subcommands.insert(name, subcommand);
        Ok(())
    }

    pub fn subcommand(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.subcommands.get(name)
    }

    pub fn subcommand_names(&self) -> impl Iterator<Item = &str> {
        self.subcommands.keys().map(String::as_str)
    }

    fn create_subcommand_options(&self) -> Vec<CreateApplicationCommandOption> {
        self.subcommands
            .values()
            .filter_map(|command| command.create_subcommand_option())
            .collect()
    }
}

impl Command for GroupSlashCommand {
    fn name(&self) -> &str {
        &self.meta.name
    }

    fn kind(&self) -> CommandKind {
        CommandKind::ChatInput
    }

    fn is_group(&self) -> bool {
        true
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.meta.guild_id
    }

    fn execute(&self, harmonia: Arc<Harmonia>, mut invocation: Invocation) {
        let Some(selected) = invocation.take_first_option() else {
            debug!("Group '{}' invoked without a subcommand", self.meta.name);
            return;
        };

        match self.subcommands.get(&selected.name) {
            Some(subcommand) => {
                invocation.set_options(selected.options);
                subcommand.execute(harmonia, invocation);
            }
            None => debug!(
                "Group '{}' has no subcommand '{}', ignoring",
                self.meta.name, selected.name
            ),
        }
    }

    fn create_payload(&self) -> CreateApplicationCommand {
        let mut command = CreateApplicationCommand::default();
        self.meta.apply(CommandKind::ChatInput, &mut command);
        for option in self.create_subcommand_options() {
            command.add_option(option);
        }
        command
    }

    fn create_subcommand_option(&self) -> Option<CreateApplicationCommandOption> {
        let mut option = CreateApplicationCommandOption::default();
        option
            .name(&self.meta.name)
            .description(&self.meta.description)
            .kind(CommandOptionType::SubCommandGroup);
        for sub_option in self.create_subcommand_options() {
            option.add_sub_option(sub_option);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandOption, SlashCommand, UserCommand};

    fn leaf(name: &str) -> Arc<dyn Command> {
        Arc::new(SlashCommand::new(name).with_description(format!("{name} things")))
    }

    #[test]
    fn test_group_with_subcommands() {
        let group = GroupSlashCommand::new("tag")
            .with_description("Manage tags")
            .with_subcommands([leaf("add"), leaf("remove")]);

        assert!(group.is_group());
        assert_eq!(group.subcommand_names().collect::<Vec<_>>(), vec!["add", "remove"]);
        assert!(group.subcommand("add").is_some());
        assert!(group.subcommand("list").is_none());
    }

    #[test]
    fn test_add_duplicate_subcommand() {
        let mut group = GroupSlashCommand::new("tag");
        group.add_subcommand(leaf("add")).unwrap();

        let err = group.add_subcommand(leaf("add")).unwrap_err();
        assert!(matches!(err, Error::DuplicateSubcommand(ref name) if name == "add"));
        assert_eq!(group.subcommand_names().count(), 1);
    }

    #[test]
    #[should_panic(expected = "subcommand 'add' already exists")]
    fn test_with_duplicate_subcommand_panics() {
        GroupSlashCommand::new("tag").with_subcommands([leaf("add"), leaf("add")]);
    }

    #[test]
    fn test_context_menu_cannot_be_nested() {
        let mut group = GroupSlashCommand::new("tag");
        let err = group
            .add_subcommand(Arc::new(UserCommand::new("Inspect")))
            .unwrap_err();
        assert!(matches!(err, Error::NotChatInput(_)));
    }

    #[test]
    fn test_nested_payload() {
        let inner = GroupSlashCommand::new("colour")
            .with_description("Colour tags")
            .with_subcommands([leaf("set")]);
        let outer = GroupSlashCommand::new("tag")
            .with_description("Manage tags")
            .with_subcommands([
                Arc::new(inner) as Arc<dyn Command>,
                Arc::new(
                    SlashCommand::new("add")
                        .with_description("Add a tag")
                        .with_options([CommandOption::new("name", CommandOptionType::String)]),
                ) as Arc<dyn Command>,
            ]);

        let payload = outer.create_payload();
        assert_eq!(payload.0.get("name").unwrap().as_str(), Some("tag"));

        let options = payload.0.get("options").unwrap().as_array().unwrap();
        assert_eq!(options.len(), 2);
        // BTreeMap order: "add" before "colour"
        assert_eq!(options[0]["name"], "add");
        assert_eq!(options[0]["type"], 1);
        assert_eq!(options[0]["options"][0]["name"], "name");
        assert_eq!(options[1]["name"], "colour");
        assert_eq!(options[1]["type"], 2);
        assert_eq!(options[1]["options"][0]["name"], "set");
    }
}
