//! Registered shortcut information.
//!
//! Every registration is recorded here, whether or not it binds a command.
//! Some entries exist purely to document a shortcut that something else
//! handles (menus, the quick reference). Dispatch never reads this list.

use super::commands::CommandId;
use super::keys::KeySequence;
use super::modes::{EditorMode, ModeMask};
use std::collections::HashSet;

/// A documented keyboard shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardShortcut {
    keys: KeySequence,
    group: String,
    title: String,
    disable_modes: ModeMask,
    order: usize,
}

impl KeyboardShortcut {
    pub fn new(
        keys: KeySequence,
        group: impl Into<String>,
        title: impl Into<String>,
        disable_modes: ModeMask,
        order: usize,
    ) -> Self {
        Self {
            keys,
            group: group.into(),
            title: title.into(),
            disable_modes,
            order,
        }
    }

    pub fn keys(&self) -> &KeySequence {
        &self.keys
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn disable_modes(&self) -> ModeMask {
        self.disable_modes
    }

    /// Registration order, used to sort help listings.
    pub fn order(&self) -> usize {
        self.order
    }
}

/// A shortcut together with the command it runs, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
    pub shortcut: KeyboardShortcut,
    pub command: Option<CommandId>,
}

impl ShortcutInfo {
    /// Human-readable description: the title, else the command id, else the
    /// keys themselves.
    pub fn description(&self) -> String {
        if !self.shortcut.title.is_empty() {
            return self.shortcut.title.clone();
        }
        match &self.command {
            Some(command) => command.to_string(),
            None => self.shortcut.keys.to_string(),
        }
    }

    pub fn is_enabled_in(&self, mode: EditorMode) -> bool {
        self.shortcut.disable_modes.allows(mode)
    }
}

/// Ordered list of every shortcut registration.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    entries: Vec<ShortcutInfo>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration. Its order is its position in the list.
    pub fn record(
        &mut self,
        keys: KeySequence,
        command: Option<CommandId>,
        group: &str,
        title: &str,
        disable_modes: ModeMask,
    ) -> &ShortcutInfo {
        let order = self.entries.len();
        self.entries.push(ShortcutInfo {
            shortcut: KeyboardShortcut::new(keys, group, title, disable_modes, order),
            command,
        });
        &self.entries[order]
    }

    /// All registrations, oldest first.
    pub fn entries(&self) -> &[ShortcutInfo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shortcuts to show for `mode`: entries disabled in the mode are
    /// dropped, duplicates of a description keep only the most recent
    /// registration, and the result is in registration order.
    pub fn active(&self, mode: EditorMode) -> Vec<&ShortcutInfo> {
        let mut active = latest_by_description(
            self.entries.iter().filter(|info| info.is_enabled_in(mode)),
        );
        active.sort_by_key(|info| info.shortcut.order);
        active
    }
}

/// Keep one entry per description: the last one in `entries`.
///
/// Walks the entries newest first and keeps the first occurrence of each
/// description. The result is newest first as well.
pub fn latest_by_description<'a, I>(entries: I) -> Vec<&'a ShortcutInfo>
where
    I: DoubleEndedIterator<Item = &'a ShortcutInfo>,
{
    let mut seen = HashSet::new();
    entries
        .rev()
        .filter(|info| seen.insert(info.description()))
        .collect()
}
