//! Responding to invocations
//!
//! Thin wrappers over serenity's interaction endpoints. Every response that
//! produces a message hands back an [`InteractionMessage`], which can be
//! edited or deleted later and used to scope component handlers.

use std::ops::Deref;
use std::sync::Arc;

use serenity::builder::{CreateComponents, CreateInteractionResponse, CreateInteractionResponseFollowup};
use serenity::http::Http;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::{Channel, Message};
use serenity::model::guild::Guild;
use serenity::model::id::InteractionId;

use crate::core::{Error, Result};
use crate::gateway::Gateway;
use crate::invocation::Invocation;
use crate::message_components::{parse_component_matrix, MessageComponent};

/// Run the same expression against either interaction variant
macro_rules! on_interaction {
    ($raw:expr, $interaction:ident => $body:expr) => {
        match $raw {
            RawInteraction::Command($interaction) => $body,
            RawInteraction::Component($interaction) => $body,
        }
    };
}

/// The interaction a response is sent to
#[derive(Debug, Clone)]
pub enum RawInteraction {
    Command(ApplicationCommandInteraction),
    Component(MessageComponentInteraction),
}

impl RawInteraction {
    pub fn id(&self) -> InteractionId {
        on_interaction!(self, interaction => interaction.id)
    }

    pub fn token(&self) -> &str {
        on_interaction!(self, interaction => interaction.token.as_str())
    }

    /// Locale of the invoking user's client
    pub fn locale(&self) -> &str {
        on_interaction!(self, interaction => interaction.locale.as_str())
    }
}

/// Response types that put a message on screen right away
fn shows_message(response: &CreateInteractionResponse<'_>) -> bool {
    let kind = response.0.get("type").and_then(|kind| kind.as_u64());
    kind == Some(InteractionResponseType::ChannelMessageWithSource as u64)
        || kind == Some(InteractionResponseType::UpdateMessage as u64)
}

/// Handle needed to answer an interaction
#[derive(Clone)]
pub(crate) struct Reply {
    http: Arc<Http>,
    interaction: Arc<RawInteraction>,
}

impl Reply {
    pub fn new(http: Arc<Http>, interaction: RawInteraction) -> Self {
        Self {
            http,
            interaction: Arc::new(interaction),
        }
    }

    pub fn interaction(&self) -> &RawInteraction {
        &self.interaction
    }

    async fn respond(&self, content: String, ephemeral: bool, components: Option<CreateComponents>) -> Result<Message> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            interaction
                .create_interaction_response(&self.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|data| {
                            data.content(content).ephemeral(ephemeral);
                            if let Some(components) = components {
                                data.set_components(components);
                            }
                            data
                        })
                })
                .await?;
            Ok(interaction.get_interaction_response(&self.http).await?)
        })
    }

    /// Send a caller-built response; the message is fetched only when one is shown
    async fn respond_raw(&self, response: CreateInteractionResponse<'static>) -> Result<Option<Message>> {
        let fetch = shows_message(&response);
        on_interaction!(self.interaction.as_ref(), interaction => {
            interaction
                .create_interaction_response(&self.http, |builder| {
                    *builder = response;
                    builder
                })
                .await?;
            if !fetch {
                return Ok(None);
            }
            Ok(Some(interaction.get_interaction_response(&self.http).await?))
        })
    }

    async fn followup_raw(&self, followup: CreateInteractionResponseFollowup<'static>) -> Result<Message> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            Ok(interaction
                .create_followup_message(&self.http, |builder| {
                    *builder = followup;
                    builder
                })
                .await?)
        })
    }

    /// Commands get a "thinking" state; components acknowledge without a visible change
    async fn defer(&self) -> Result<()> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            interaction.defer(&self.http).await?;
        });
        Ok(())
    }

    async fn edit_original(&self, content: String, components: Option<CreateComponents>) -> Result<Message> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            Ok(interaction
                .edit_original_interaction_response(&self.http, |response| {
                    response.content(content);
                    if let Some(components) = components {
                        response.set_components(components);
                    }
                    response
                })
                .await?)
        })
    }

    async fn delete_original(&self) -> Result<()> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            interaction.delete_original_interaction_response(&self.http).await?;
        });
        Ok(())
    }

    async fn followup(&self, content: String, ephemeral: bool, components: Option<CreateComponents>) -> Result<Message> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            Ok(interaction
                .create_followup_message(&self.http, |followup| {
                    followup.content(content).ephemeral(ephemeral);
                    if let Some(components) = components {
                        followup.set_components(components);
                    }
                    followup
                })
                .await?)
        })
    }

    async fn edit_message(&self, message: &Message, content: String, components: Option<CreateComponents>) -> Result<Message> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            Ok(interaction
                .edit_followup_message(&self.http, message.id, |followup| {
                    followup.content(content);
                    if let Some(components) = components {
                        followup.set_components(components);
                    }
                    followup
                })
                .await?)
        })
    }

    async fn delete_message(&self, message: &Message) -> Result<()> {
        on_interaction!(self.interaction.as_ref(), interaction => {
            interaction.delete_followup_message(&self.http, message.id).await?;
        });
        Ok(())
    }
}

/// A message sent in response to an invocation.
///
/// Dereferences to the [`Message`]; `guild` and `channel` are resolved
/// best-effort.
pub struct InteractionMessage {
    pub message: Message,
    pub guild: Option<Guild>,
    pub channel: Option<Channel>,
    reply: Reply,
    gateway: Arc<dyn Gateway>,
}

impl InteractionMessage {
    async fn resolve(message: Message, reply: Reply, gateway: Arc<dyn Gateway>) -> Self {
        let guild = match message.guild_id {
            Some(guild_id) => gateway.guild(guild_id).await.ok(),
            None => None,
        };
        let channel = gateway.channel(message.channel_id).await.ok();

        Self {
            message,
            guild,
            channel,
            reply,
            gateway,
        }
    }

    /// Replace the content; returns the edited message
    pub async fn edit(&self, content: impl Into<String>) -> Result<InteractionMessage> {
        let message = self.reply.edit_message(&self.message, content.into(), None).await?;
        Ok(Self::resolve(message, self.reply.clone(), Arc::clone(&self.gateway)).await)
    }

    pub async fn edit_with_components(
        &self,
        content: impl Into<String>,
        rows: Vec<Vec<MessageComponent>>,
    ) -> Result<InteractionMessage> {
        let components = parse_component_matrix(rows);
        let message = self
            .reply
            .edit_message(&self.message, content.into(), Some(components))
            .await?;
        Ok(Self::resolve(message, self.reply.clone(), Arc::clone(&self.gateway)).await)
    }

    pub async fn delete(&self) -> Result<()> {
        self.reply.delete_message(&self.message).await
    }
}

impl Deref for InteractionMessage {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}

impl Invocation {
    fn reply(&self) -> Result<&Reply> {
        self.reply.as_ref().ok_or(Error::NotRespondable)
    }

    async fn wrap(&self, message: Message) -> Result<InteractionMessage> {
        let reply = self.reply()?.clone();
        Ok(InteractionMessage::resolve(message, reply, Arc::clone(&self.gateway)).await)
    }

    /// The interaction behind this invocation, if it came from the platform
    pub fn interaction(&self) -> Option<&RawInteraction> {
        self.reply.as_ref().map(Reply::interaction)
    }

    pub async fn respond(&self, content: impl Into<String>) -> Result<InteractionMessage> {
        let message = self.reply()?.respond(content.into(), false, None).await?;
        self.wrap(message).await
    }

    /// Respond so that only the invoking user sees the message
    pub async fn ephemeral_respond(&self, content: impl Into<String>) -> Result<InteractionMessage> {
        let message = self.reply()?.respond(content.into(), true, None).await?;
        self.wrap(message).await
    }

    /// Respond with one action row per inner vector of `rows`
    pub async fn respond_with_components(
        &self,
        content: impl Into<String>,
        rows: Vec<Vec<MessageComponent>>,
    ) -> Result<InteractionMessage> {
        let components = parse_component_matrix(rows);
        let message = self
            .reply()?
            .respond(content.into(), false, Some(components))
            .await?;
        self.wrap(message).await
    }

    /// Respond with a fully custom response: embeds, attachments, modals or
    /// any response type.
    ///
    /// Returns the shown message for message and update responses, `None` for
    /// deferrals and modals.
    pub async fn respond_complex<F>(&self, build: F) -> Result<Option<InteractionMessage>>
    where
        F: for<'a> FnOnce(&'a mut CreateInteractionResponse<'static>) -> &'a mut CreateInteractionResponse<'static> + Send,
    {
        let reply = self.reply()?;
        let mut response = CreateInteractionResponse::default();
        build(&mut response);

        match reply.respond_raw(response).await? {
            Some(message) => Ok(Some(self.wrap(message).await?)),
            None => Ok(None),
        }
    }

    /// Acknowledge now and answer later with [`followup`](Self::followup)
    pub async fn defer_response(&self) -> Result<()> {
        self.reply()?.defer().await
    }

    pub async fn edit_response(&self, content: impl Into<String>) -> Result<InteractionMessage> {
        let message = self.reply()?.edit_original(content.into(), None).await?;
        self.wrap(message).await
    }

    pub async fn edit_response_with_components(
        &self,
        content: impl Into<String>,
        rows: Vec<Vec<MessageComponent>>,
    ) -> Result<InteractionMessage> {
        let components = parse_component_matrix(rows);
        let message = self
            .reply()?
            .edit_original(content.into(), Some(components))
            .await?;
        self.wrap(message).await
    }

    pub async fn delete_response(&self) -> Result<()> {
        self.reply()?.delete_original().await
    }

    pub async fn followup(&self, content: impl Into<String>) -> Result<InteractionMessage> {
        let message = self.reply()?.followup(content.into(), false, None).await?;
        self.wrap(message).await
    }

    pub async fn ephemeral_followup(&self, content: impl Into<String>) -> Result<InteractionMessage> {
        let message = self.reply()?.followup(content.into(), true, None).await?;
        self.wrap(message).await
    }

    /// Follow up with a fully custom message, e.g. one carrying embeds or files
    pub async fn followup_complex<F>(&self, build: F) -> Result<InteractionMessage>
    where
        F: for<'a> FnOnce(&'a mut CreateInteractionResponseFollowup<'static>) -> &'a mut CreateInteractionResponseFollowup<'static>
            + Send,
    {
        let reply = self.reply()?;
        let mut followup = CreateInteractionResponseFollowup::default();
        build(&mut followup);

        let message = reply.followup_raw(followup).await?;
        self.wrap(message).await
    }

    pub async fn followup_with_components(
        &self,
        content: impl Into<String>,
        rows: Vec<Vec<MessageComponent>>,
    ) -> Result<InteractionMessage> {
        let components = parse_component_matrix(rows);
        let message = self
            .reply()?
            .followup(content.into(), false, Some(components))
            .await?;
        self.wrap(message).await
    }
}
