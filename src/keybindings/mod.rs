//! Keyboard shortcut dispatch.
//!
//! Key events go into a `ShortcutDispatcher`, which buffers multi-key
//! chords, asks its keymaps for a match in priority order and runs the
//! matched command through the host's `CommandRegistry`. Registrations are
//! also kept as `ShortcutInfo` records so help surfaces can be generated
//! from the same source.

mod commands;
mod dispatch;
mod help;
mod keymap;
mod keys;
mod modes;
mod registry;
mod timer;

pub use commands::{CommandEntry, CommandId, CommandRegistry, CommandTable};
pub use dispatch::{
    DisableHandle, DispatchOptions, KeyDown, KeyOutcome, Platform, ShortcutDispatcher,
    ShortcutEvent,
};
pub use help::{generate_help, shortcut_rows, ShortcutRow};
pub use keymap::{ActivationContext, CommandBinding, KeyMap, KeyMapType, KeyMatcher};
pub use keys::{KeyCombination, KeySequence, ParseError};
pub use modes::{parse_disable_modes, try_parse_disable_modes, EditorMode, ModeMask};
pub use registry::{latest_by_description, KeyboardShortcut, ShortcutInfo, ShortcutRegistry};
pub use timer::{KeyTimer, DEFAULT_CHORD_TIMEOUT};
