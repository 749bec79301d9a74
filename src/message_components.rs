//! Message components: handler registry and action row building
//!
//! Handlers are keyed by custom ID. A handler can also be scoped to one sent
//! message, in which case it is stored under `{message-id}-{custom-id}` and
//! only fires for components on that message.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serenity::builder::{CreateActionRow, CreateButton, CreateComponents, CreateSelectMenu};
use serenity::model::id::MessageId;

use crate::commands::CommandFunc;
use crate::core::{Error, Result};

/// Handler run when a component is used; same shape as a command handler
pub type ComponentHandler = CommandFunc;

/// Key of a handler scoped to a single message
pub fn scoped_custom_id(message_id: MessageId, custom_id: &str) -> String {
    format!("{message_id}-{custom_id}")
}

/// Registry of component handlers
#[derive(Default)]
pub struct ComponentRegistry {
    handlers: DashMap<String, ComponentHandler>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every component with `custom_id`
    pub fn add(&self, custom_id: &str, handler: ComponentHandler) -> Result<()> {
        if custom_id.is_empty() {
            return Err(Error::EmptyCustomId);
        }

        match self.handlers.entry(custom_id.to_string()) {
            Entry::Occupied(_) => Err(Error::ComponentExists(custom_id.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(handler);
                Ok(())
            }
        }
    }

    /// Register a handler for `custom_id` on one message only
    pub fn add_scoped(&self, message_id: MessageId, custom_id: &str, handler: ComponentHandler) -> Result<()> {
        if custom_id.is_empty() {
            return Err(Error::EmptyCustomId);
        }

        match self.handlers.entry(scoped_custom_id(message_id, custom_id)) {
            Entry::Occupied(_) => Err(Error::ScopedComponentExists {
                message_id,
                custom_id: custom_id.to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(handler);
                Ok(())
            }
        }
    }

    pub fn remove(&self, custom_id: &str) -> Result<()> {
        self.handlers
            .remove(custom_id)
            .map(|_| ())
            .ok_or_else(|| Error::ComponentNotFound(custom_id.to_string()))
    }

    pub fn remove_scoped(&self, message_id: MessageId, custom_id: &str) -> Result<()> {
        self.handlers
            .remove(&scoped_custom_id(message_id, custom_id))
            .map(|_| ())
            .ok_or_else(|| Error::ScopedComponentNotFound {
                message_id,
                custom_id: custom_id.to_string(),
            })
    }

    /// Resolve the handler for a component on `message_id`.
    ///
    /// The unscoped key is tried first, so a global handler shadows a
    /// message-scoped one with the same custom ID.
    pub fn resolve(&self, message_id: Option<MessageId>, custom_id: &str) -> Option<ComponentHandler> {
        if let Some(handler) = self.handlers.get(custom_id) {
            return Some(Arc::clone(handler.value()));
        }

        let message_id = message_id?;
        self.handlers
            .get(&scoped_custom_id(message_id, custom_id))
            .map(|handler| Arc::clone(handler.value()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A single component placed in an action row
#[derive(Debug, Clone)]
pub enum MessageComponent {
    Button(CreateButton),
    SelectMenu(CreateSelectMenu),
}

impl From<CreateButton> for MessageComponent {
    fn from(button: CreateButton) -> Self {
        MessageComponent::Button(button)
    }
}

impl From<CreateSelectMenu> for MessageComponent {
    fn from(menu: CreateSelectMenu) -> Self {
        MessageComponent::SelectMenu(menu)
    }
}

/// Turn a matrix of components into action rows, one row per inner vector.
///
/// Row order and the order within each row are kept as given.
pub fn parse_component_matrix(matrix: Vec<Vec<MessageComponent>>) -> CreateComponents {
    let mut components = CreateComponents::default();
    for row in matrix {
        let mut action_row = CreateActionRow::default();
        for component in row {
            match component {
                MessageComponent::Button(button) => action_row.add_button(button),
                MessageComponent::SelectMenu(menu) => action_row.add_select_menu(menu),
            };
        }
        components.add_action_row(action_row);
    }
    components
}
