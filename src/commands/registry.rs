//! Command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 2.0.0: Store Command trait objects, reject duplicate names, allow concurrent mutation
//! - 1.0.0: Initial implementation for handler dispatch

use std::sync::Arc;

use dashmap::DashMap;

use super::handler::Command;
use crate::core::{Error, Result};

/// Registry mapping top-level command names to commands
///
/// Subcommands live inside their [`GroupSlashCommand`](super::GroupSlashCommand),
/// only the top level is registered here.
///
/// # Example
///
/// ```ignore
/// let registry = CommandRegistry::new();
/// registry.add(Arc::new(SlashCommand::new("ping").with_command(pong)))?;
///
/// if let Some(command) = registry.get("ping") {
///     command.execute(harmonia, invocation);
/// }
/// ```
#[derive(Default)]
pub struct CommandRegistry {
    commands: DashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its name
    ///
    /// Fails with [`Error::CommandExists`] if the name is taken; the existing
    /// entry is kept.
    pub fn add(&self, command: Arc<dyn Command>) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        match self.commands.entry(command.name().to_string()) {
            Entry::Occupied(entry) => Err(Error::CommandExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(command);
                Ok(())
            }
        }
    }

    /// Get command by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.remove(name).map(|(_, command)| command)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Snapshot of the registered commands
    ///
    /// Taken up front so callers can await between items without holding a
    /// shard lock.
    pub fn all(&self) -> Vec<Arc<dyn Command>> {
        self.commands
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn command_names(&self) -> Vec<String> {
        self.commands.iter().map(|entry| entry.key().clone()).collect()
    }
}
