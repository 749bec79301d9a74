//! # Command System
//!
//! Builders for slash commands, subcommand groups and context menu commands,
//! and the registry the dispatcher resolves them from.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 3.0.0: Builder API with a single Command trait for every variant
//! - 2.1.0: Add modular handler infrastructure (handler trait, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context_menu;
pub mod group;
pub mod handler;
pub mod option;
pub mod registry;
pub mod slash;

pub use context_menu::{MessageCommand, UserCommand};
pub use group::GroupSlashCommand;
pub use handler::{command_fn, is_valid_chat_input_name, Command, CommandFunc, CommandKind};
pub use option::{Choice, ChoiceValue, CommandOption};
pub use registry::CommandRegistry;
pub use slash::SlashCommand;
