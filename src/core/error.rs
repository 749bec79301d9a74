//! Error type for registry, dispatch and response operations
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.6.0
//!
//! ## Changelog
//! - 1.0.0: Replace stringly errors with a typed enum

use serenity::model::id::MessageId;
use thiserror::Error;

/// Operational failures reported to the caller.
///
/// Programmer mistakes made while building commands (empty or malformed
/// names, duplicate option names) panic instead; see the builders.
#[derive(Debug, Error)]
pub enum Error {
    #[error("command '{0}' already exists")]
    CommandExists(String),

    #[error("command '{0}' was not found")]
    CommandNotFound(String),

    #[error("command '{0}' was not registered")]
    CommandNotRegistered(String),

    #[error("subcommand '{0}' already exists")]
    DuplicateSubcommand(String),

    #[error("command '{0}' is not a chat input command and cannot be nested")]
    NotChatInput(String),

    #[error("empty custom id")]
    EmptyCustomId,

    #[error("custom id '{0}' already exists")]
    ComponentExists(String),

    #[error("custom id '{custom_id}' already exists on message '{message_id}'")]
    ScopedComponentExists {
        message_id: MessageId,
        custom_id: String,
    },

    #[error("custom id '{0}' not found")]
    ComponentNotFound(String),

    #[error("custom id '{custom_id}' not found on message '{message_id}'")]
    ScopedComponentNotFound {
        message_id: MessageId,
        custom_id: String,
    },

    #[error("invocation has no target")]
    NoTarget,

    #[error("invocation is not backed by a live interaction")]
    NotRespondable,

    #[error("not connected, commands have not been registered yet")]
    NotConnected,

    #[error("{0} is not cached")]
    NotCached(&'static str),

    #[error(transparent)]
    Discord(#[from] serenity::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
