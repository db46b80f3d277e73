//! Tests for the shortcut records behind help surfaces.

mod test_utils;

use keychord::keybindings::{
    generate_help, latest_by_description, shortcut_rows, CommandId, DispatchOptions, EditorMode,
    Platform, ShortcutInfo,
};
use pretty_assertions::assert_eq;
use test_utils::*;

fn descriptions(infos: &[&ShortcutInfo]) -> Vec<String> {
    infos.iter().map(|info| info.description()).collect()
}

// ============================================================================
// Active Shortcut Info
// ============================================================================

#[test]
fn test_active_info_in_registration_order() {
    let mut h = Harness::new(&["save", "open", "quit"]);
    h.dispatcher
        .register(keys("Ctrl+S"), Some("save".into()), "File", "Save", "");
    h.dispatcher
        .register(keys("Ctrl+O"), Some("open".into()), "File", "Open", "");
    h.dispatcher
        .register(keys("Ctrl+Q"), Some("quit".into()), "App", "Quit", "");

    assert_eq!(
        descriptions(&h.dispatcher.active_shortcut_info()),
        vec!["Save", "Open", "Quit"]
    );
}

#[test]
fn test_entries_disabled_in_mode_are_hidden() {
    let mut h = Harness::new(&["save", "find"]);
    h.dispatcher
        .register(keys("Ctrl+S"), Some("save".into()), "File", "Save", "");
    h.dispatcher
        .register(keys("Ctrl+F"), Some("find".into()), "Edit", "Find", "vim,emacs");

    assert_eq!(h.dispatcher.active_shortcut_info().len(), 2);

    h.dispatcher.set_editor_mode(EditorMode::Vim);
    assert_eq!(
        descriptions(&h.dispatcher.active_shortcut_info()),
        vec!["Save"]
    );
}

#[test]
fn test_last_registration_wins_per_description() {
    let mut h = Harness::new(&["save", "open"]);
    h.dispatcher
        .register(keys("Ctrl+S"), Some("save".into()), "File", "Save", "");
    h.dispatcher
        .register(keys("Ctrl+O"), Some("open".into()), "File", "Open", "");
    h.dispatcher
        .register(keys("Ctrl+X Ctrl+S"), Some("save".into()), "File", "Save", "");

    let active = h.dispatcher.active_shortcut_info();
    assert_eq!(descriptions(&active), vec!["Open", "Save"]);
    assert_eq!(active[1].shortcut.keys(), &keys("Ctrl+X Ctrl+S"));

    // Both registrations stay bound
    assert_eq!(h.type_keys("Ctrl+S Ctrl+X Ctrl+S").len(), 3);
    assert_eq!(h.executed(), vec!["save", "save"]);
}

#[test]
fn test_mode_filter_applies_before_deduplication() {
    let mut h = Harness::new(&["save"]);
    h.dispatcher
        .register(keys("Ctrl+S"), Some("save".into()), "File", "Save", "");
    h.dispatcher.register(
        keys("Ctrl+X Ctrl+S"),
        Some("save".into()),
        "File",
        "Save",
        "default,vim",
    );

    // In vim the later entry is filtered out, so the earlier one shows
    h.dispatcher.set_editor_mode(EditorMode::Vim);
    let active = h.dispatcher.active_shortcut_info();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].shortcut.keys(), &keys("Ctrl+S"));
}

#[test]
fn test_description_fallbacks() {
    let mut h = Harness::new(&["save"]);
    h.dispatcher
        .register(keys("Ctrl+S"), Some("save".into()), "File", "", "");
    h.dispatcher.register(keys("F1"), None, "Help", "", "");

    assert_eq!(
        descriptions(&h.dispatcher.active_shortcut_info()),
        vec!["save", "F1"]
    );
}

#[test]
fn test_latest_by_description_is_newest_first() {
    let mut h = Harness::new(&["a", "b"]);
    h.dispatcher
        .register(keys("Ctrl+A"), Some("a".into()), "", "Alpha", "");
    h.dispatcher
        .register(keys("Ctrl+B"), Some("b".into()), "", "Beta", "");
    h.dispatcher
        .register(keys("Ctrl+Shift+A"), Some("a".into()), "", "Alpha", "");

    let latest = latest_by_description(h.dispatcher.shortcuts().entries().iter());
    assert_eq!(descriptions(&latest), vec!["Alpha", "Beta"]);
    assert_eq!(latest[0].shortcut.order(), 2);
}

// ============================================================================
// Default Shortcut Labels
// ============================================================================

#[test]
fn test_registration_sets_command_label() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+S", "save");
    h.bind("Ctrl+X Ctrl+S", "save");

    let entry = h
        .dispatcher
        .commands()
        .get(&CommandId::from("save"))
        .unwrap();
    assert_eq!(entry.shortcut.as_deref(), Some("Ctrl+X Ctrl+S"));
}

#[test]
fn test_command_shortcut_displayed_on_macos() {
    let options = DispatchOptions {
        platform: Platform::MacOS,
        ..DispatchOptions::default()
    };
    let mut h = Harness::with_options(&["preferences"], options);
    h.dispatcher.register(
        keys("Cmd+,"),
        Some("preferences".into()),
        "App",
        "Preferences",
        "",
    );

    assert_eq!(h.dispatcher.shortcuts().len(), 1);
    assert_eq!(h.press("Cmd+,"), handled("preferences"));
    let entry = h
        .dispatcher
        .commands()
        .get(&CommandId::from("preferences"))
        .unwrap();
    assert_eq!(entry.shortcut.as_deref(), Some("Cmd+,"));
}

// ============================================================================
// Help Output
// ============================================================================

#[test]
fn test_help_text_from_active_shortcuts() {
    let mut h = Harness::new(&["save", "quit"]);
    h.dispatcher
        .register(keys("Ctrl+X Ctrl+S"), Some("save".into()), "File", "Save", "");
    h.dispatcher
        .register(keys("Ctrl+Q"), Some("quit".into()), "App", "Quit", "");

    let lines = generate_help(&h.dispatcher.active_shortcut_info());
    assert_eq!(
        lines,
        vec![
            "  File".to_string(),
            "  ────".to_string(),
            "  Ctrl+X Ctrl+S   Save".to_string(),
            String::new(),
            "  App".to_string(),
            "  ───".to_string(),
            format!("  Ctrl+Q{}Quit", " ".repeat(10)),
        ]
    );
}

#[test]
fn test_json_rows() {
    let mut h = Harness::new(&["save"]);
    h.dispatcher
        .register(keys("Ctrl+S"), Some("save".into()), "File", "Save", "");
    h.dispatcher.register(keys("Ctrl+Z"), None, "Edit", "Undo", "");

    let rows = shortcut_rows(&h.dispatcher.active_shortcut_info());
    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"keys": "Ctrl+S", "group": "File", "description": "Save", "command": "save"},
            {"keys": "Ctrl+Z", "group": "Edit", "description": "Undo"},
        ])
    );
}
