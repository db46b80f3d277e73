//! Built-in shortcuts and commands of the terminal host.
//!
//! `DEFAULT_SHORTCUTS` is registered at startup, before user configuration,
//! so a user binding for the same keys replaces the built-in one.

use crate::keybindings::{CommandRegistry, CommandTable, EditorMode, KeySequence, ShortcutDispatcher};
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// A built-in shortcut.
#[derive(Debug, Clone)]
pub struct DefaultShortcut {
    pub keys: &'static str,
    /// None for shortcuts that are only documented here
    pub command: Option<&'static str>,
    pub group: &'static str,
    pub title: &'static str,
    pub disable_modes: &'static str,
}

const fn shortcut(
    keys: &'static str,
    command: Option<&'static str>,
    group: &'static str,
    title: &'static str,
    disable_modes: &'static str,
) -> DefaultShortcut {
    DefaultShortcut {
        keys,
        command,
        group,
        title,
        disable_modes,
    }
}

/// All built-in shortcuts, in help order.
pub static DEFAULT_SHORTCUTS: &[DefaultShortcut] = &[
    // File
    shortcut("Ctrl+S", Some("save"), "File", "Save", ""),
    shortcut("Ctrl+X Ctrl+S", Some("save"), "File", "Save", "default,vim"),
    shortcut("Ctrl+O", Some("open"), "File", "Open file", ""),
    shortcut("Ctrl+X Ctrl+F", Some("open"), "File", "Open file", "default,vim"),
    // Edit
    shortcut("Ctrl+F", Some("find"), "Edit", "Find", "emacs"),
    shortcut("Ctrl+Z", None, "Edit", "Undo (handled by the editor)", ""),
    // Editor modes
    shortcut("Ctrl+K Ctrl+D", Some("mode_default"), "Modes", "Default keybindings", ""),
    shortcut("Ctrl+K Ctrl+V", Some("mode_vim"), "Modes", "Vim keybindings", ""),
    shortcut("Ctrl+K Ctrl+E", Some("mode_emacs"), "Modes", "Emacs keybindings", ""),
    // Application
    shortcut("Ctrl+Shift+P", Some("palette"), "Application", "Command palette", ""),
    shortcut("Ctrl+G", Some("overlay"), "Application", "Open overlay (suspends shortcuts)", ""),
    shortcut("F1", Some("help"), "Application", "Show shortcuts", ""),
    shortcut("Cmd+,", Some("preferences"), "Application", "Preferences", ""),
    shortcut("Ctrl+Q", Some("quit"), "Application", "Quit", ""),
];

/// Requests that host commands leave for the event loop to act on.
#[derive(Debug, Default)]
pub struct HostRequests {
    pub quit: bool,
    pub show_help: bool,
    pub open_overlay: bool,
    pub editor_mode: Option<EditorMode>,
}

pub type SharedRequests = Rc<RefCell<HostRequests>>;

/// Build the host's command table. Commands that affect the host record a
/// request in `requests`; the rest only log.
pub fn host_commands(requests: &SharedRequests) -> CommandTable {
    let mut table = CommandTable::new();

    for (id, label) in [
        ("save", "Save"),
        ("open", "Open file"),
        ("find", "Find"),
        ("palette", "Command palette"),
        ("preferences", "Preferences"),
    ] {
        table.insert_with_action(id, label, move || {
            tracing::info!("{}", label);
            Ok(())
        });
    }

    let r = Rc::clone(requests);
    table.insert_with_action("quit", "Quit", move || {
        r.borrow_mut().quit = true;
        Ok(())
    });

    let r = Rc::clone(requests);
    table.insert_with_action("help", "Show shortcuts", move || {
        r.borrow_mut().show_help = true;
        Ok(())
    });

    let r = Rc::clone(requests);
    table.insert_with_action("overlay", "Open overlay", move || {
        r.borrow_mut().open_overlay = true;
        Ok(())
    });

    for (id, mode) in [
        ("mode_default", EditorMode::Default),
        ("mode_vim", EditorMode::Vim),
        ("mode_emacs", EditorMode::Emacs),
    ] {
        let r = Rc::clone(requests);
        table.insert_with_action(id, format!("{} keybindings", mode), move || {
            r.borrow_mut().editor_mode = Some(mode);
            Ok(())
        });
    }

    table
}

/// Register every built-in shortcut.
pub fn register_defaults<R: CommandRegistry>(dispatcher: &mut ShortcutDispatcher<R>) -> Result<()> {
    for default in DEFAULT_SHORTCUTS {
        let keys: KeySequence = default
            .keys
            .parse()
            .with_context(|| format!("invalid built-in shortcut '{}'", default.keys))?;
        dispatcher.register(
            keys,
            default.command.map(Into::into),
            default.group,
            default.title,
            default.disable_modes,
        );
    }
    Ok(())
}
