//! The command side of the dispatcher.
//!
//! The dispatcher never owns commands. It talks to a `CommandRegistry` that
//! knows whether a command is currently enabled, how to run it, and where to
//! show its default shortcut.

use super::registry::KeyboardShortcut;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of an application command (e.g. `"save_source"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CommandId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Host-provided access to application commands.
pub trait CommandRegistry {
    /// Whether the command can run right now. Disabled commands never match.
    fn is_enabled(&self, command: &CommandId) -> bool;

    /// Run the command.
    fn execute(&mut self, command: &CommandId) -> Result<()>;

    /// Record `shortcut` as the one to show next to the command in menus.
    fn set_default_shortcut(&mut self, command: &CommandId, shortcut: &KeyboardShortcut);
}

type Action = Box<dyn FnMut() -> Result<()>>;

/// A registered command.
pub struct CommandEntry {
    pub label: String,
    pub enabled: bool,
    /// Display label of the default shortcut, set during registration
    pub shortcut: Option<String>,
    action: Option<Action>,
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("label", &self.label)
            .field("enabled", &self.enabled)
            .field("shortcut", &self.shortcut)
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// A simple in-memory `CommandRegistry`.
///
/// Commands run an optional closure; every execution is appended to
/// `history`. Unknown commands are treated as disabled.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: HashMap<CommandId, CommandEntry>,
    history: Vec<CommandId>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an enabled command without an action.
    pub fn insert(&mut self, id: impl Into<CommandId>, label: impl Into<String>) {
        self.commands.insert(
            id.into(),
            CommandEntry {
                label: label.into(),
                enabled: true,
                shortcut: None,
                action: None,
            },
        );
    }

    /// Add (or replace) an enabled command that runs `action`.
    pub fn insert_with_action<F>(&mut self, id: impl Into<CommandId>, label: impl Into<String>, action: F)
    where
        F: FnMut() -> Result<()> + 'static,
    {
        self.commands.insert(
            id.into(),
            CommandEntry {
                label: label.into(),
                enabled: true,
                shortcut: None,
                action: Some(Box::new(action)),
            },
        );
    }

    pub fn set_enabled(&mut self, id: &CommandId, enabled: bool) {
        if let Some(entry) = self.commands.get_mut(id) {
            entry.enabled = enabled;
        }
    }

    pub fn get(&self, id: &CommandId) -> Option<&CommandEntry> {
        self.commands.get(id)
    }

    pub fn contains(&self, id: &CommandId) -> bool {
        self.commands.contains_key(id)
    }

    /// Commands executed so far, oldest first.
    pub fn history(&self) -> &[CommandId] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl CommandRegistry for CommandTable {
    fn is_enabled(&self, command: &CommandId) -> bool {
        self.commands.get(command).is_some_and(|c| c.enabled)
    }

    fn execute(&mut self, command: &CommandId) -> Result<()> {
        let Some(entry) = self.commands.get_mut(command) else {
            anyhow::bail!("unknown command '{}'", command);
        };
        self.history.push(command.clone());
        match entry.action.as_mut() {
            Some(action) => action(),
            None => Ok(()),
        }
    }

    fn set_default_shortcut(&mut self, command: &CommandId, shortcut: &KeyboardShortcut) {
        if let Some(entry) = self.commands.get_mut(command) {
            entry.shortcut = Some(shortcut.keys().to_string());
        }
    }
}
