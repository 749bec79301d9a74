//! Routing of incoming interactions to registered handlers
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 1.1.0: Message-scoped component handlers
//! - 1.0.0: Command and component dispatch through the registries

use std::sync::Arc;

use log::debug;
use serenity::http::Http;
use serenity::model::application::interaction::application_command::CommandDataOption;
use serenity::model::application::interaction::Interaction;
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, MessageId, TargetId};
use serenity::model::user::User;

use crate::author::Author;
use crate::commands::handler::launch;
use crate::gateway::Gateway;
use crate::harmonia::Harmonia;
use crate::interaction::{RawInteraction, Reply};
use crate::invocation::Invocation;

/// What was used: a command or a message component
#[derive(Debug, Clone)]
pub enum EventKind {
    Command {
        name: String,
        options: Vec<CommandDataOption>,
        target_id: Option<TargetId>,
    },
    Component {
        custom_id: String,
        message_id: MessageId,
        values: Vec<String>,
    },
}

/// An interaction reduced to the parts dispatch needs
pub struct IncomingEvent {
    pub kind: EventKind,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub user: User,
    pub member: Option<Member>,
    reply: Option<Reply>,
}

impl IncomingEvent {
    /// Normalize a serenity interaction.
    ///
    /// Returns `None` for kinds harmonia does not handle (ping, autocomplete,
    /// modal submit).
    pub fn from_interaction(interaction: Interaction, http: Arc<Http>) -> Option<Self> {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                let event = Self {
                    kind: EventKind::Command {
                        name: command.data.name.clone(),
                        options: command.data.options.clone(),
                        target_id: command.data.target_id,
                    },
                    guild_id: command.guild_id,
                    channel_id: command.channel_id,
                    user: command.user.clone(),
                    member: command.member.clone(),
                    reply: None,
                };
                Some(event.with_reply(Reply::new(http, RawInteraction::Command(command))))
            }
            Interaction::MessageComponent(component) => {
                let event = Self {
                    kind: EventKind::Component {
                        custom_id: component.data.custom_id.clone(),
                        message_id: component.message.id,
                        values: component.data.values.clone(),
                    },
                    guild_id: component.guild_id,
                    channel_id: component.channel_id,
                    user: component.user.clone(),
                    member: component.member.clone(),
                    reply: None,
                };
                Some(event.with_reply(Reply::new(http, RawInteraction::Component(component))))
            }
            _ => None,
        }
    }

    /// Event for a command, without a live interaction to answer
    pub fn command(name: impl Into<String>, channel_id: ChannelId, user: User) -> Self {
        Self::detached(
            EventKind::Command {
                name: name.into(),
                options: Vec::new(),
                target_id: None,
            },
            channel_id,
            user,
        )
    }

    /// Event for a component, without a live interaction to answer
    pub fn component(custom_id: impl Into<String>, message_id: MessageId, channel_id: ChannelId, user: User) -> Self {
        Self::detached(
            EventKind::Component {
                custom_id: custom_id.into(),
                message_id,
                values: Vec::new(),
            },
            channel_id,
            user,
        )
    }

    fn detached(kind: EventKind, channel_id: ChannelId, user: User) -> Self {
        Self {
            kind,
            guild_id: None,
            channel_id,
            user,
            member: None,
            reply: None,
        }
    }

    pub fn with_options(mut self, new_options: Vec<CommandDataOption>) -> Self {
        if let EventKind::Command { options, .. } = &mut self.kind {
            *options = new_options;
        }
        self
    }

    pub fn with_target(mut self, target: TargetId) -> Self {
        if let EventKind::Command { target_id, .. } = &mut self.kind {
            *target_id = Some(target);
        }
        self
    }

    pub fn with_values(mut self, new_values: Vec<String>) -> Self {
        if let EventKind::Component { values, .. } = &mut self.kind {
            *values = new_values;
        }
        self
    }

    pub fn with_guild(mut self, guild_id: GuildId, member: Option<Member>) -> Self {
        self.guild_id = Some(guild_id);
        self.member = member;
        self
    }

    fn with_reply(mut self, reply: Reply) -> Self {
        self.reply = Some(reply);
        self
    }
}

impl Harmonia {
    /// Route one event to its handler.
    ///
    /// Returns once the handler has been launched; it runs on its own task.
    /// Unknown commands and unhandled custom IDs are ignored.
    pub async fn dispatch(self: &Arc<Self>, gateway: Arc<dyn Gateway>, event: IncomingEvent) {
        match event.kind.clone() {
            EventKind::Command {
                name,
                options,
                target_id,
            } => {
                let Some(command) = self.commands().get(&name) else {
                    debug!("No command registered as '{name}', ignoring");
                    return;
                };

                let mut invocation = build_invocation(gateway, event).await;
                invocation.options = options;
                invocation.target_id = target_id;
                command.execute(Arc::clone(self), invocation);
            }
            EventKind::Component {
                custom_id,
                message_id,
                values,
            } => {
                let Some(handler) = self.components().resolve(Some(message_id), &custom_id) else {
                    debug!("No component handler for '{custom_id}' on message {message_id}, ignoring");
                    return;
                };

                let mut invocation = build_invocation(gateway, event).await;
                invocation.values = values;
                invocation.message_id = Some(message_id);
                launch(custom_id, handler, Arc::clone(self), invocation);
            }
        }
    }
}

/// Resolve guild, channel and author; each lookup may fail independently
async fn build_invocation(gateway: Arc<dyn Gateway>, event: IncomingEvent) -> Invocation {
    let mut invocation = Invocation::new(Arc::clone(&gateway), event.channel_id);
    invocation.guild_id = event.guild_id;
    invocation.reply = event.reply;
    invocation.channel = gateway.channel(event.channel_id).await.ok();

    if let Some(guild_id) = event.guild_id {
        invocation.guild = gateway.guild(guild_id).await.ok();
    }

    invocation.author = match (event.guild_id, event.member) {
        (Some(guild_id), Some(member)) => {
            match Author::from_member(gateway.as_ref(), guild_id, invocation.guild.clone(), member).await {
                Ok(author) => Some(author),
                Err(e) => {
                    debug!("Could not resolve member author: {e}");
                    None
                }
            }
        }
        _ => Some(Author::from_user(event.user)),
    };

    invocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, GroupSlashCommand, SlashCommand, UserCommand};
    use crate::testing::{nested_option, option, test_member, test_user, FakeGateway};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn gateway() -> Arc<dyn Gateway> {
        Arc::new(FakeGateway::default())
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
        timeout(Duration::from_secs(1), rx.recv()).await.ok().flatten()
    }

    async fn nothing(rx: &mut mpsc::UnboundedReceiver<String>) -> bool {
        timeout(Duration::from_millis(100), rx.recv()).await.is_err()
    }

    #[tokio::test]
    async fn test_dispatch_unregistered_command() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        harmonia
            .add_command(SlashCommand::new("ping").with_command(move |_, _| {
                let tx = tx.clone();
                async move {
                    tx.send("ping".to_string())?;
                    Ok(())
                }
            }))
            .unwrap();

        harmonia
            .dispatch(gateway(), IncomingEvent::command("pong", ChannelId(1), test_user(1, "a")))
            .await;
        assert!(nothing(&mut rx).await);
    }

    #[tokio::test]
    async fn test_dispatch_command_with_options() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        harmonia
            .add_command(SlashCommand::new("echo").with_command(move |_, inv| {
                let tx = tx.clone();
                async move {
                    let text = inv.get_string("text").unwrap_or_default().to_string();
                    let author = inv.author.as_ref().map(|a| a.name.clone()).unwrap_or_default();
                    tx.send(format!("{author}: {text}"))?;
                    Ok(())
                }
            }))
            .unwrap();

        let event = IncomingEvent::command("echo", ChannelId(1), test_user(1, "ferris"))
            .with_options(vec![option("text", 3, json!("hi"))]);
        harmonia.dispatch(gateway(), event).await;

        assert_eq!(recv(&mut rx).await.as_deref(), Some("ferris: hi"));
    }

    #[tokio::test]
    async fn test_dispatch_member_author() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        harmonia
            .add_command(SlashCommand::new("whoami").with_command(move |_, inv| {
                let tx = tx.clone();
                async move {
                    let author = inv.author.expect("author resolved");
                    tx.send(format!("{} {}", author.is_member, author.display_name()))?;
                    Ok(())
                }
            }))
            .unwrap();

        let member = test_member(7, 1, "ferris", Some("Crab"), &[]);
        let event = IncomingEvent::command("whoami", ChannelId(1), member.user.clone())
            .with_guild(GuildId(7), Some(member));
        harmonia.dispatch(gateway(), event).await;

        assert_eq!(recv(&mut rx).await.as_deref(), Some("true Crab"));
    }

    #[tokio::test]
    async fn test_dispatch_member_looks_up_guild_once() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        harmonia
            .add_command(SlashCommand::new("whoami").with_command(move |_, inv| {
                let tx = tx.clone();
                async move {
                    tx.send(inv.author.is_some().to_string())?;
                    Ok(())
                }
            }))
            .unwrap();

        let fake = Arc::new(FakeGateway::default());
        let member = test_member(7, 1, "ferris", None, &[]);
        let event = IncomingEvent::command("whoami", ChannelId(1), member.user.clone())
            .with_guild(GuildId(7), Some(member));
        harmonia.dispatch(fake.clone(), event).await;

        assert_eq!(recv(&mut rx).await.as_deref(), Some("true"));
        assert_eq!(fake.guild_lookups(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_user_command_target() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        harmonia
            .add_command(UserCommand::new("Inspect").with_command(move |_, inv| {
                let tx = tx.clone();
                async move {
                    let target = inv.target_author().await?;
                    tx.send(target.name.clone())?;
                    Ok(())
                }
            }))
            .unwrap();

        let gateway: Arc<dyn Gateway> = Arc::new(FakeGateway::default().with_user(test_user(9, "target")));
        let event = IncomingEvent::command("Inspect", ChannelId(1), test_user(1, "a")).with_target(TargetId(9));
        harmonia.dispatch(gateway, event).await;

        assert_eq!(recv(&mut rx).await.as_deref(), Some("target"));
    }

    #[tokio::test]
    async fn test_dispatch_group_routes_to_subcommand() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tx_add = tx.clone();
        let add = SlashCommand::new("add").with_command(move |_, inv| {
            let tx = tx_add.clone();
            async move {
                tx.send(format!("add {}", inv.get_string("name").unwrap_or_default()))?;
                Ok(())
            }
        });
        let set = SlashCommand::new("set").with_command(move |_, inv| {
            let tx = tx.clone();
            async move {
                tx.send(format!("set {}", inv.get_string("colour").unwrap_or_default()))?;
                Ok(())
            }
        });
        let colour = GroupSlashCommand::new("colour").with_subcommands([Arc::new(set) as Arc<dyn Command>]);
        harmonia
            .add_command(
                GroupSlashCommand::new("tag")
                    .with_subcommands([Arc::new(add) as Arc<dyn Command>, Arc::new(colour) as Arc<dyn Command>]),
            )
            .unwrap();

        let event = IncomingEvent::command("tag", ChannelId(1), test_user(1, "a")).with_options(vec![nested_option(
            "add",
            1,
            vec![option("name", 3, json!("rust"))],
        )]);
        harmonia.dispatch(gateway(), event).await;
        assert_eq!(recv(&mut rx).await.as_deref(), Some("add rust"));

        let event = IncomingEvent::command("tag", ChannelId(1), test_user(1, "a")).with_options(vec![nested_option(
            "colour",
            2,
            vec![nested_option("set", 1, vec![option("colour", 3, json!("orange"))])],
        )]);
        harmonia.dispatch(gateway(), event).await;
        assert_eq!(recv(&mut rx).await.as_deref(), Some("set orange"));

        // Unknown subcommand and missing subcommand are both ignored
        let event = IncomingEvent::command("tag", ChannelId(1), test_user(1, "a"))
            .with_options(vec![nested_option("remove", 1, Vec::new())]);
        harmonia.dispatch(gateway(), event).await;
        harmonia
            .dispatch(gateway(), IncomingEvent::command("tag", ChannelId(1), test_user(1, "a")))
            .await;
        assert!(nothing(&mut rx).await);
    }

    #[tokio::test]
    async fn test_dispatch_scoped_component() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        harmonia
            .add_component_handler_to_message(MessageId(50), "n_increase", move |_, inv| {
                let tx = tx.clone();
                async move {
                    tx.send(format!("scoped {:?}", inv.message_id))?;
                    Ok(())
                }
            })
            .unwrap();

        let event = IncomingEvent::component("n_increase", MessageId(50), ChannelId(1), test_user(1, "a"));
        harmonia.dispatch(gateway(), event).await;
        assert_eq!(recv(&mut rx).await.as_deref(), Some("scoped Some(MessageId(50))"));

        // Same custom ID on another message has no handler
        let event = IncomingEvent::component("n_increase", MessageId(51), ChannelId(1), test_user(1, "a"));
        harmonia.dispatch(gateway(), event).await;
        assert!(nothing(&mut rx).await);
    }

    #[tokio::test]
    async fn test_dispatch_unscoped_component_wins() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tx_scoped = tx.clone();
        harmonia
            .add_component_handler("choice", move |_, _| {
                let tx = tx.clone();
                async move {
                    tx.send("global".to_string())?;
                    Ok(())
                }
            })
            .unwrap();
        harmonia
            .add_component_handler_to_message(MessageId(50), "choice", move |_, _| {
                let tx = tx_scoped.clone();
                async move {
                    tx.send("scoped".to_string())?;
                    Ok(())
                }
            })
            .unwrap();

        let event = IncomingEvent::component("choice", MessageId(50), ChannelId(1), test_user(1, "a"));
        harmonia.dispatch(gateway(), event).await;

        assert_eq!(recv(&mut rx).await.as_deref(), Some("global"));
        assert!(nothing(&mut rx).await);
    }

    #[tokio::test]
    async fn test_dispatch_select_menu_values() {
        let harmonia = Arc::new(Harmonia::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        harmonia
            .add_component_handler("class_select", move |_, inv| {
                let tx = tx.clone();
                async move {
                    tx.send(inv.values.join(","))?;
                    Ok(())
                }
            })
            .unwrap();

        let event = IncomingEvent::component("class_select", MessageId(1), ChannelId(1), test_user(1, "a"))
            .with_values(vec!["mage".to_string(), "rogue".to_string()]);
        harmonia.dispatch(gateway(), event).await;

        assert_eq!(recv(&mut rx).await.as_deref(), Some("mage,rogue"));
    }

    #[tokio::test]
    async fn test_handler_can_register_components() {
        let harmonia = Arc::new(Harmonia::new());
        harmonia
            .add_command(SlashCommand::new("number").with_command(|harmonia, _| async move {
                harmonia.add_component_handler_to_message(MessageId(77), "n_reset", |_, _| async { Ok(()) })?;
                Ok(())
            }))
            .unwrap();

        harmonia
            .dispatch(gateway(), IncomingEvent::command("number", ChannelId(1), test_user(1, "a")))
            .await;

        let registered = timeout(Duration::from_secs(1), async {
            while !harmonia.components().contains("77-n_reset") {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert!(registered.is_ok());
    }
}
