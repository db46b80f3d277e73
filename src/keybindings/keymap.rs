//! Keymaps: tries from key sequences to command bindings.

use super::commands::{CommandId, CommandRegistry};
use super::keys::{KeyCombination, KeySequence};
use super::modes::{EditorMode, ModeMask};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dispatch priority buckets. Declaration order is dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMapType {
    /// Bindings contributed by add-ins
    Addin,
    /// Editor command bindings (user-customizable)
    Editor,
    /// Application command bindings
    Application,
}

impl KeyMapType {
    /// All map types in dispatch order.
    pub const ALL: [KeyMapType; 3] = [
        KeyMapType::Addin,
        KeyMapType::Editor,
        KeyMapType::Application,
    ];

    pub fn index(self) -> usize {
        match self {
            KeyMapType::Addin => 0,
            KeyMapType::Editor => 1,
            KeyMapType::Application => 2,
        }
    }
}

/// A command bound to a key sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBinding {
    pub command: CommandId,
    /// Editor modes in which this binding is switched off
    pub disable_modes: ModeMask,
    /// When false, executions are not reported as "executed via shortcut"
    pub record: bool,
}

impl CommandBinding {
    pub fn new(command: impl Into<CommandId>) -> Self {
        Self {
            command: command.into(),
            disable_modes: ModeMask::empty(),
            record: true,
        }
    }

    pub fn disabled_in(mut self, modes: ModeMask) -> Self {
        self.disable_modes = modes;
        self
    }

    /// Mark as an internal binding whose executions are not reported.
    pub fn unrecorded(mut self) -> Self {
        self.record = false;
        self
    }
}

/// What a matcher needs to decide whether a binding may fire right now.
#[derive(Clone, Copy)]
pub struct ActivationContext<'a> {
    pub mode: EditorMode,
    pub commands: &'a dyn CommandRegistry,
}

impl<'a> ActivationContext<'a> {
    pub fn new(mode: EditorMode, commands: &'a dyn CommandRegistry) -> Self {
        Self { mode, commands }
    }

    /// A binding is active when its mode mask allows the current mode and
    /// its command is enabled.
    pub fn is_active(&self, binding: &CommandBinding) -> bool {
        binding.disable_modes.allows(self.mode) && self.commands.is_enabled(&binding.command)
    }
}

/// The two questions the dispatcher asks of every keymap category.
pub trait KeyMatcher {
    /// The binding exactly matching `keys` that may fire in `ctx`, if any.
    fn active_binding(&self, keys: &KeySequence, ctx: &ActivationContext<'_>)
        -> Option<&CommandBinding>;

    /// True when some registered sequence starts with (or equals) `keys`.
    fn is_prefix(&self, keys: &KeySequence) -> bool;
}

#[derive(Debug, Default)]
struct Node {
    binding: Option<CommandBinding>,
    children: HashMap<KeyCombination, Node>,
}

impl Node {
    fn is_empty(&self) -> bool {
        self.binding.is_none() && self.children.is_empty()
    }

    fn collect(&self, path: &mut Vec<KeyCombination>, out: &mut Vec<(KeySequence, CommandBinding)>) {
        if let Some(binding) = &self.binding {
            out.push((KeySequence::from(path.clone()), binding.clone()));
        }
        for (key, child) in &self.children {
            path.push(*key);
            child.collect(path, out);
            path.pop();
        }
    }

    /// Remove the binding at `path`, pruning empty branches. Returns the
    /// removed binding.
    fn remove(&mut self, path: &[KeyCombination]) -> Option<CommandBinding> {
        match path.split_first() {
            None => self.binding.take(),
            Some((key, rest)) => {
                let child = self.children.get_mut(key)?;
                let removed = child.remove(rest);
                if child.is_empty() {
                    self.children.remove(key);
                }
                removed
            }
        }
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&CommandBinding) -> bool) -> usize {
        let mut removed = 0;
        if self.binding.as_ref().is_some_and(|b| !keep(b)) {
            self.binding = None;
            removed += 1;
        }
        self.children.retain(|_, child| {
            removed += child.retain(keep);
            !child.is_empty()
        });
        removed
    }
}

/// A trie of key sequences. Sequences of different lengths may share a
/// prefix (`Ctrl+G` and `Ctrl+G Ctrl+G` coexist); an identical sequence
/// replaces the previous binding.
#[derive(Debug, Default)]
pub struct KeyMap {
    root: Node,
    len: usize,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `keys` to `binding`, replacing any binding for the same sequence.
    ///
    /// An empty sequence is ignored.
    pub fn add_binding(&mut self, keys: &KeySequence, binding: CommandBinding) {
        if keys.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for key in keys {
            node = node.children.entry(*key).or_default();
        }
        match node.binding.replace(binding) {
            Some(previous) => {
                tracing::debug!("Rebinding {} (was {})", keys, previous.command);
            }
            None => self.len += 1,
        }
    }

    /// Remove the binding for exactly `keys`.
    pub fn remove_binding(&mut self, keys: &KeySequence) -> Option<CommandBinding> {
        let keys: Vec<KeyCombination> = keys.iter().copied().collect();
        let removed = self.root.remove(&keys);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Remove every binding for `command`. Returns how many were removed.
    pub fn clear_command(&mut self, command: &CommandId) -> usize {
        let removed = self.root.retain(&mut |b: &CommandBinding| &b.command != command);
        self.len -= removed;
        removed
    }

    /// The binding registered for exactly `keys`, regardless of mode.
    pub fn get(&self, keys: &KeySequence) -> Option<&CommandBinding> {
        self.node(keys)?.binding.as_ref()
    }

    /// All sequences bound to `command`, sorted for stable output.
    pub fn bindings_for(&self, command: &CommandId) -> Vec<KeySequence> {
        let mut found: Vec<KeySequence> = self
            .bindings()
            .into_iter()
            .filter(|(_, b)| &b.command == command)
            .map(|(keys, _)| keys)
            .collect();
        found.sort_by_key(|keys| keys.to_string());
        found
    }

    /// Every (sequence, binding) pair in the map.
    pub fn bindings(&self) -> Vec<(KeySequence, CommandBinding)> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut Vec::new(), &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, keys: &KeySequence) -> Option<&Node> {
        let mut node = &self.root;
        for key in keys {
            node = node.children.get(key)?;
        }
        Some(node)
    }
}

impl KeyMatcher for KeyMap {
    fn active_binding(
        &self,
        keys: &KeySequence,
        ctx: &ActivationContext<'_>,
    ) -> Option<&CommandBinding> {
        if keys.is_empty() {
            return None;
        }
        self.get(keys).filter(|b| ctx.is_active(b))
    }

    fn is_prefix(&self, keys: &KeySequence) -> bool {
        if keys.is_empty() {
            return false;
        }
        self.node(keys).is_some_and(|n| !n.is_empty())
    }
}
