//! The `Harmonia` instance: registries, remote registration and the
//! serenity event handler
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Explicit instance instead of process-wide state, concurrent registries
//! - 1.0.0: Initial command registration and dispatch

use std::future::Future;
use std::sync::{Arc, OnceLock};

use log::{debug, error, info};
use serenity::async_trait;
use serenity::client::{Client, Context, EventHandler};
use serenity::model::application::command::Command as RegisteredCommand;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::id::{GuildId, MessageId};
use serenity::prelude::GatewayIntents;

use crate::commands::{command_fn, Command, CommandRegistry};
use crate::core::{Error, Result};
use crate::dispatch::IncomingEvent;
use crate::gateway::{Gateway, SerenityGateway};
use crate::invocation::Invocation;
use crate::message_components::ComponentRegistry;

/// Owns every registered command and component handler.
///
/// Shared as `Arc<Harmonia>`; handlers receive that `Arc` and may register or
/// remove component handlers while running.
///
/// # Example
///
/// ```ignore
/// let harmonia = Arc::new(Harmonia::new());
/// harmonia.add_command(
///     SlashCommand::new("ping")
///         .with_description("Ping!")
///         .with_command(|_, inv| async move {
///             inv.respond("Pong!").await?;
///             Ok(())
///         }),
/// )?;
/// harmonia.run(&token).await?;
/// ```
#[derive(Default)]
pub struct Harmonia {
    commands: CommandRegistry,
    components: ComponentRegistry,
    gateway: OnceLock<Arc<dyn Gateway>>,
}

impl Harmonia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Register a command; fails if its name is taken
    pub fn add_command(&self, command: impl Command + 'static) -> Result<()> {
        self.add_shared_command(Arc::new(command))
    }

    pub fn add_shared_command(&self, command: Arc<dyn Command>) -> Result<()> {
        self.commands.add(command)
    }

    pub fn add_component_handler<F, Fut>(&self, custom_id: &str, handler: F) -> Result<()>
    where
        F: Fn(Arc<Harmonia>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.components.add(custom_id, command_fn(handler))
    }

    /// Handle `custom_id` only when used on the message `message_id`
    pub fn add_component_handler_to_message<F, Fut>(
        &self,
        message_id: MessageId,
        custom_id: &str,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(Arc<Harmonia>, Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.components.add_scoped(message_id, custom_id, command_fn(handler))
    }

    pub fn remove_component_handler(&self, custom_id: &str) -> Result<()> {
        self.components.remove(custom_id)
    }

    pub fn remove_component_handler_from_message(&self, message_id: MessageId, custom_id: &str) -> Result<()> {
        self.components.remove_scoped(message_id, custom_id)
    }

    /// Create every registered command remotely and record its registration.
    ///
    /// Stops at the first failure. The gateway is kept for later removals.
    pub async fn register_commands(&self, gateway: Arc<dyn Gateway>) -> Result<()> {
        let _ = self.gateway.set(Arc::clone(&gateway));

        for command in self.commands.all() {
            let registered = gateway
                .create_command(command.guild_id(), command.create_payload())
                .await?;
            match command.guild_id() {
                Some(guild_id) => info!("✅ Registered /{} in guild {guild_id}", command.name()),
                None => info!("✅ Registered /{} globally", command.name()),
            }
            command.set_registration(registered);
        }
        Ok(())
    }

    /// Delete a command's remote registration, then forget it locally
    pub async fn remove_command(&self, name: &str) -> Result<()> {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;
        let registration = command
            .registration()
            .ok_or_else(|| Error::CommandNotRegistered(name.to_string()))?;
        let gateway = self.gateway.get().ok_or(Error::NotConnected)?;

        gateway.delete_command(command.guild_id(), registration.id).await?;
        self.commands.remove(name);
        debug!("Removed command '{name}'");
        Ok(())
    }

    /// Commands the platform currently holds for `guild_id`, or global ones
    /// for `None`; includes registrations this instance never made
    pub async fn remote_commands(&self, guild_id: Option<GuildId>) -> Result<Vec<RegisteredCommand>> {
        let gateway = self.gateway.get().ok_or(Error::NotConnected)?;
        gateway.commands(guild_id).await
    }

    /// Remove every command one by one.
    ///
    /// The first failure is returned; commands removed before it stay removed.
    pub async fn remove_all_commands(&self) -> Result<()> {
        for name in self.commands.command_names() {
            self.remove_command(&name).await?;
        }
        info!("🧹 Removed all commands");
        Ok(())
    }

    /// Build a client with harmonia's event handler attached
    pub async fn client(self: &Arc<Self>, token: &str) -> Result<Client> {
        let client = Client::builder(token, GatewayIntents::GUILDS)
            .event_handler(HarmoniaHandler {
                harmonia: Arc::clone(self),
            })
            .await?;
        Ok(client)
    }

    /// Build a client and run it until the connection ends
    pub async fn run(self: &Arc<Self>, token: &str) -> Result<()> {
        let mut client = self.client(token).await?;
        client.start().await?;
        Ok(())
    }
}

/// Registers commands once connected and dispatches interactions
pub struct HarmoniaHandler {
    harmonia: Arc<Harmonia>,
}

impl HarmoniaHandler {
    pub fn new(harmonia: Arc<Harmonia>) -> Self {
        Self { harmonia }
    }
}

#[async_trait]
impl EventHandler for HarmoniaHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);

        let gateway: Arc<dyn Gateway> = Arc::new(SerenityGateway::from_context(&ctx));
        if let Err(e) = self.harmonia.register_commands(gateway).await {
            error!("❌ Failed to register commands: {e}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(event) = IncomingEvent::from_interaction(interaction, Arc::clone(&ctx.http)) else {
            return;
        };

        let gateway: Arc<dyn Gateway> = Arc::new(SerenityGateway::from_context(&ctx));
        self.harmonia.dispatch(gateway, event).await;
    }
}
