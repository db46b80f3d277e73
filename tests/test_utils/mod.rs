//! Test utilities and fixtures for keychord tests

#![allow(dead_code)]

use keychord::keybindings::{
    CommandTable, DispatchOptions, KeyCombination, KeyDown, KeyOutcome, KeySequence, Platform,
    ShortcutDispatcher, ShortcutEvent,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub fn key(s: &str) -> KeyCombination {
    s.parse()
        .unwrap_or_else(|e| panic!("invalid key '{}': {}", s, e))
}

pub fn keys(s: &str) -> KeySequence {
    s.parse()
        .unwrap_or_else(|e| panic!("invalid key sequence '{}': {}", s, e))
}

/// Options for a platform without a Command key, so tests behave the same
/// on every host.
pub fn linux_options() -> DispatchOptions {
    DispatchOptions {
        platform: Platform::Linux,
        ..DispatchOptions::default()
    }
}

/// Options that keep chords of unmodified keys alive.
pub fn chord_friendly_options() -> DispatchOptions {
    DispatchOptions {
        clear_unmodified: false,
        ..linux_options()
    }
}

/// A command table where every id is enabled and labelled with itself.
pub fn command_table(ids: &[&str]) -> CommandTable {
    let mut table = CommandTable::new();
    for id in ids {
        table.insert(*id, *id);
    }
    table
}

/// A dispatcher with a controllable clock.
pub struct Harness {
    pub dispatcher: ShortcutDispatcher<CommandTable>,
    pub events: mpsc::UnboundedReceiver<ShortcutEvent>,
    pub now: Instant,
}

impl Harness {
    pub fn new(commands: &[&str]) -> Self {
        Self::with_options(commands, linux_options())
    }

    pub fn with_options(commands: &[&str], options: DispatchOptions) -> Self {
        Self::with_table(command_table(commands), options)
    }

    pub fn with_table(table: CommandTable, options: DispatchOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            dispatcher: ShortcutDispatcher::new(table, tx, options),
            events: rx,
            now: Instant::now(),
        }
    }

    /// Register `sequence` for `command` in the application map, titled
    /// after the command.
    pub fn bind(&mut self, sequence: &str, command: &str) {
        self.dispatcher
            .register(keys(sequence), Some(command.into()), "Test", command, "");
    }

    pub fn press(&mut self, k: &str) -> KeyOutcome {
        self.press_key(key(k))
    }

    pub fn press_key(&mut self, combination: KeyCombination) -> KeyOutcome {
        let mut event = KeyDown::new(combination);
        self.dispatcher.on_key_down(&mut event, self.now)
    }

    /// Press each whitespace-separated key in turn.
    pub fn type_keys(&mut self, sequence: &str) -> Vec<KeyOutcome> {
        sequence.split_whitespace().map(|k| self.press(k)).collect()
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
    }

    pub fn pending(&self) -> String {
        self.dispatcher.pending_keys().to_string()
    }

    /// Commands executed so far, oldest first.
    pub fn executed(&self) -> Vec<String> {
        self.dispatcher
            .commands()
            .history()
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    pub fn drain_events(&mut self) -> Vec<ShortcutEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn handled(command: &str) -> KeyOutcome {
    KeyOutcome::Handled(command.into())
}
