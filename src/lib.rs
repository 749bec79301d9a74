// Core layer - error type and configuration
pub mod core;

// Command builders and registry
pub mod commands;

// Components and their handler registry
pub mod message_components;

// Invocation context
pub mod author;
pub mod invocation;

// Platform access and responses
pub mod gateway;
pub mod interaction;

// Dispatch and the Harmonia instance
pub mod dispatch;
pub mod harmonia;

#[cfg(test)]
pub(crate) mod testing;

pub use author::Author;
pub use commands::{
    Choice, ChoiceValue, Command, CommandFunc, CommandKind, CommandOption, GroupSlashCommand, MessageCommand,
    SlashCommand, UserCommand,
};
pub use crate::core::{Config, Error, Result};
pub use dispatch::{EventKind, IncomingEvent};
pub use gateway::{Gateway, SerenityGateway};
pub use harmonia::{Harmonia, HarmoniaHandler};
pub use interaction::{InteractionMessage, RawInteraction};
pub use invocation::Invocation;
pub use message_components::{parse_component_matrix, MessageComponent};
