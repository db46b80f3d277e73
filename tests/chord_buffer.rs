//! Tests for the key buffer: multi-key chords, prefix buffering, the idle
//! timeout and the events that abandon a chord.

mod test_utils;

use keychord::keybindings::{DispatchOptions, KeyOutcome};
use std::time::Duration;
use test_utils::*;

use KeyOutcome::{Pending, Unhandled};

// ============================================================================
// Chords
// ============================================================================

#[test]
fn test_chord_executes_after_second_key() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    assert_eq!(h.type_keys("Ctrl+X Ctrl+S"), vec![Pending, handled("save")]);
    assert_eq!(h.executed(), vec!["save"]);
    assert!(h.dispatcher.pending_keys().is_empty());
}

#[test]
fn test_pending_keys_visible_mid_chord() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    assert_eq!(h.pending(), "Ctrl+X");
}

#[test]
fn test_wrong_continuation_clears_buffer() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    assert_eq!(h.type_keys("Ctrl+X Ctrl+J"), vec![Pending, Unhandled]);
    assert!(h.dispatcher.pending_keys().is_empty());

    // The second key alone is not a shortcut either
    assert_eq!(h.press("Ctrl+S"), Unhandled);
    assert!(h.executed().is_empty());
}

#[test]
fn test_shorter_binding_fires_before_longer_one() {
    let mut h = Harness::new(&["short", "long"]);
    h.bind("Ctrl+G", "short");
    h.bind("Ctrl+G Ctrl+H", "long");

    assert_eq!(h.press("Ctrl+G"), handled("short"));
    assert_eq!(h.press("Ctrl+H"), Unhandled);
    assert_eq!(h.executed(), vec!["short"]);
}

#[test]
fn test_chords_sharing_a_prefix() {
    let mut h = Harness::new(&["save", "open"]);
    h.bind("Ctrl+X Ctrl+S", "save");
    h.bind("Ctrl+X Ctrl+F", "open");

    h.type_keys("Ctrl+X Ctrl+F Ctrl+X Ctrl+S");
    assert_eq!(h.executed(), vec!["open", "save"]);
}

#[test]
fn test_three_key_chord() {
    let mut h = Harness::new(&["deep"]);
    h.bind("Ctrl+K Ctrl+K Ctrl+D", "deep");

    assert_eq!(
        h.type_keys("Ctrl+K Ctrl+K Ctrl+D"),
        vec![Pending, Pending, handled("deep")]
    );
}

// ============================================================================
// Unmodified Keys
// ============================================================================

#[test]
fn test_unmodified_key_never_stays_pending() {
    let mut h = Harness::new(&["top"]);
    h.bind("g g", "top");

    // With the default options a bare key always drops the buffer
    assert_eq!(h.type_keys("g g"), vec![Unhandled, Unhandled]);
    assert!(h.executed().is_empty());
}

#[test]
fn test_unmodified_key_ends_modified_chord() {
    let mut h = Harness::new(&["deep"]);
    h.bind("Ctrl+X a b", "deep");

    assert_eq!(h.type_keys("Ctrl+X a"), vec![Pending, Unhandled]);
    assert!(h.dispatcher.pending_keys().is_empty());
}

#[test]
fn test_unmodified_key_can_complete_a_chord() {
    let mut h = Harness::new(&["append"]);
    h.bind("Ctrl+X a", "append");

    assert_eq!(h.type_keys("Ctrl+X a"), vec![Pending, handled("append")]);
}

#[test]
fn test_unmodified_prefix_pending_when_clearing_disabled() {
    let mut h = Harness::with_options(&["top", "here"], chord_friendly_options());
    h.bind("g g", "top");
    h.bind("g h", "here");

    assert_eq!(h.press("g"), Pending);
    assert_eq!(h.pending(), "G");
    assert_eq!(h.press("g"), handled("top"));
}

#[test]
fn test_unmodified_prefix_without_continuation_clears() {
    let mut h = Harness::with_options(&["top", "here"], chord_friendly_options());
    h.bind("g g", "top");
    h.bind("g h", "here");

    assert_eq!(h.type_keys("g x"), vec![Pending, Unhandled]);
    assert!(h.dispatcher.pending_keys().is_empty());
    assert!(h.executed().is_empty());
}

// ============================================================================
// Idle Timeout
// ============================================================================

#[test]
fn test_idle_timeout_clears_buffer() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    h.advance(3001);

    assert!(h.dispatcher.poll_timer(h.now), "timer should fire");
    assert!(h.dispatcher.pending_keys().is_empty());
    assert_eq!(h.press("Ctrl+S"), Unhandled);
}

#[test]
fn test_timer_fires_once() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    h.advance(3001);

    assert!(h.dispatcher.poll_timer(h.now));
    assert!(!h.dispatcher.poll_timer(h.now));
}

#[test]
fn test_keystroke_within_timeout_completes_chord() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    h.advance(2999);

    assert!(!h.dispatcher.poll_timer(h.now));
    assert_eq!(h.press("Ctrl+S"), handled("save"));
}

#[test]
fn test_expired_timer_checked_on_next_keystroke() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    // The host never polls; the late keystroke still sees a fresh buffer
    h.press("Ctrl+X");
    h.advance(3500);

    assert_eq!(h.press("Ctrl+S"), Unhandled);
    assert!(h.executed().is_empty());
}

#[test]
fn test_each_keystroke_restarts_timer() {
    let mut h = Harness::new(&["deep"]);
    h.bind("Ctrl+K Ctrl+K Ctrl+D", "deep");

    h.press("Ctrl+K");
    h.advance(2000);
    h.press("Ctrl+K");
    h.advance(2000);

    assert_eq!(h.press("Ctrl+D"), handled("deep"));
}

#[test]
fn test_custom_chord_timeout() {
    let options = DispatchOptions {
        chord_timeout: Duration::from_millis(500),
        ..linux_options()
    };
    let mut h = Harness::with_options(&["save"], options);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    h.advance(600);

    assert!(h.dispatcher.poll_timer(h.now));
    assert_eq!(h.press("Ctrl+S"), Unhandled);
}

// ============================================================================
// Abandoning a Chord
// ============================================================================

#[test]
fn test_escape_clears_pending_chord() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    assert_eq!(h.type_keys("Ctrl+X Esc"), vec![Pending, Unhandled]);
    assert!(h.dispatcher.pending_keys().is_empty());
    assert_eq!(h.press("Ctrl+S"), Unhandled);
}

#[test]
fn test_escape_clears_while_disabled() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    let _overlay = h.dispatcher.disable();

    assert_eq!(h.press("Esc"), Unhandled);
    assert!(h.dispatcher.pending_keys().is_empty());
}

#[test]
fn test_escape_binding_is_never_dispatched() {
    let mut h = Harness::new(&["close"]);
    h.bind("Esc", "close");

    assert_eq!(h.press("Esc"), Unhandled);
    assert!(h.executed().is_empty());
}

#[test]
fn test_editor_activity_abandons_chord() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    h.dispatcher.on_editor_activity(false);

    assert!(h.dispatcher.pending_keys().is_empty());
}

#[test]
fn test_chained_editor_activity_keeps_chord() {
    let mut h = Harness::new(&["save"]);
    h.bind("Ctrl+X Ctrl+S", "save");

    h.press("Ctrl+X");
    h.dispatcher.on_editor_activity(true);

    assert_eq!(h.pending(), "Ctrl+X");
    assert_eq!(h.press("Ctrl+S"), handled("save"));
}
