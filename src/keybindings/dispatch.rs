//! The shortcut dispatcher.
//!
//! Turns key-down events into command executions. Keystrokes accumulate in a
//! key buffer; after each one the keymaps are asked, in dispatch order, for
//! a binding matching the whole buffer. The first match runs and clears the
//! buffer. Without a match the buffer is kept only while some keymap still
//! has a longer sequence starting with it.

use super::commands::{CommandId, CommandRegistry};
use super::keymap::{ActivationContext, CommandBinding, KeyMap, KeyMapType, KeyMatcher};
use super::keys::{KeyCombination, KeySequence};
use super::modes::{parse_disable_modes, EditorMode, ModeMask};
use super::registry::{ShortcutInfo, ShortcutRegistry};
use super::timer::{KeyTimer, DEFAULT_CHORD_TIMEOUT};
use crate::util::send_or_log;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Platform the host runs on. Decides which modifier is the "command" key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Platform::MacOS
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Platform::Linux
        }
    }

    /// Only macOS keyboards have a usable Command/Meta key.
    pub fn has_meta_key(self) -> bool {
        self == Platform::MacOS
    }

    fn command_modifier(self) -> KeyModifiers {
        if self.has_meta_key() {
            KeyModifiers::SUPER
        } else {
            KeyModifiers::CONTROL
        }
    }
}

/// Tunables for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Idle time after which a pending chord is dropped
    pub chord_timeout: Duration,
    /// Drop the buffer after any keystroke without modifiers, so ordinary
    /// typing never leaves a stale chord behind. This also makes chords
    /// like `g g` impossible.
    pub clear_unmodified: bool,
    pub platform: Platform,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            chord_timeout: DEFAULT_CHORD_TIMEOUT,
            clear_unmodified: true,
            platform: Platform::current(),
        }
    }
}

/// A key-down event as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDown {
    key: KeyCombination,
    canceled: bool,
    default_prevented: bool,
}

impl KeyDown {
    pub fn new(key: KeyCombination) -> Self {
        Self {
            key,
            canceled: false,
            default_prevented: false,
        }
    }

    /// Convert a terminal key event. Key releases are not key-downs.
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => Some(Self::new(event.into())),
            KeyEventKind::Release => None,
        }
    }

    pub fn key(&self) -> KeyCombination {
        self.key
    }

    /// Claim the event: nothing else should handle it.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Suppress the host's built-in action for the key.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Result of feeding one keystroke to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A binding matched and its command ran
    Handled(CommandId),
    /// No match yet, but the buffer is a prefix of a registered sequence
    Pending,
    /// The keystroke is not a shortcut; let the focused widget have it
    Unhandled,
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, KeyOutcome::Handled(_))
    }
}

/// Notifications sent to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutEvent {
    /// A command ran because its shortcut was typed
    CommandExecuted {
        command: CommandId,
        keys: KeySequence,
    },
}

/// Scope of a `ShortcutDispatcher::disable` call.
///
/// Dispatch stays off until every outstanding handle is closed. Closing is
/// idempotent and dropping the handle closes it.
#[derive(Debug)]
pub struct DisableHandle {
    count: Arc<AtomicUsize>,
    closed: bool,
}

impl DisableHandle {
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.count.fetch_sub(1, Ordering::SeqCst);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for DisableHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Keyboard shortcut dispatcher. One per UI session, owned by the host.
pub struct ShortcutDispatcher<R: CommandRegistry> {
    commands: R,
    events: mpsc::UnboundedSender<ShortcutEvent>,
    options: DispatchOptions,
    /// One map per `KeyMapType`, in dispatch order
    keymaps: Vec<KeyMap>,
    /// Extra categories, consulted after the built-in maps
    matchers: Vec<Box<dyn KeyMatcher>>,
    shortcuts: ShortcutRegistry,
    key_buffer: KeySequence,
    timer: KeyTimer,
    disable_count: Arc<AtomicUsize>,
    editor_mode: EditorMode,
}

impl<R: CommandRegistry> ShortcutDispatcher<R> {
    pub fn new(
        commands: R,
        events: mpsc::UnboundedSender<ShortcutEvent>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            commands,
            events,
            keymaps: KeyMapType::ALL.iter().map(|_| KeyMap::new()).collect(),
            matchers: Vec::new(),
            shortcuts: ShortcutRegistry::new(),
            key_buffer: KeySequence::new(),
            timer: KeyTimer::new(options.chord_timeout),
            disable_count: Arc::new(AtomicUsize::new(0)),
            editor_mode: EditorMode::default(),
            options,
        }
    }

    pub fn commands(&self) -> &R {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut R {
        &mut self.commands
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    // ─────────────────────────────────────────────────────────────────────
    // Enable / disable
    // ─────────────────────────────────────────────────────────────────────

    pub fn is_enabled(&self) -> bool {
        self.disable_count.load(Ordering::SeqCst) == 0
    }

    /// Suspend dispatch until the returned handle is closed. Nests.
    ///
    /// The key buffer is left alone, so a chord started before a modal
    /// overlay can be finished after it closes.
    pub fn disable(&self) -> DisableHandle {
        self.disable_count.fetch_add(1, Ordering::SeqCst);
        DisableHandle {
            count: Arc::clone(&self.disable_count),
            closed: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Editor mode
    // ─────────────────────────────────────────────────────────────────────

    pub fn editor_mode(&self) -> EditorMode {
        self.editor_mode
    }

    pub fn set_editor_mode(&mut self, mode: EditorMode) {
        tracing::debug!("Editor mode set to {}", mode);
        self.editor_mode = mode;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────

    /// Register a shortcut. `disable_modes` is a comma-separated mode list
    /// such as `"vim,emacs"`.
    ///
    /// The shortcut is always recorded for help listings. When `command` is
    /// given it also becomes the command's default shortcut and is bound in
    /// the application keymap.
    pub fn register(
        &mut self,
        keys: KeySequence,
        command: Option<CommandId>,
        group: &str,
        title: &str,
        disable_modes: &str,
    ) {
        let modes = parse_disable_modes(disable_modes);
        self.register_with_modes(keys, command, group, title, modes);
    }

    /// `register` with an already parsed mode mask.
    pub fn register_with_modes(
        &mut self,
        keys: KeySequence,
        command: Option<CommandId>,
        group: &str,
        title: &str,
        disable_modes: ModeMask,
    ) {
        if !self.options.platform.has_meta_key() && keys.uses_meta() {
            tracing::debug!("Skipping {}: no meta key on this platform", keys);
            return;
        }

        let info = self
            .shortcuts
            .record(keys.clone(), command.clone(), group, title, disable_modes);

        if let Some(command) = command {
            self.commands.set_default_shortcut(&command, &info.shortcut);
            self.keymaps[KeyMapType::Application.index()].add_binding(
                &keys,
                CommandBinding::new(command).disabled_in(disable_modes),
            );
        }
    }

    /// Register a two-step chord such as `Ctrl+X Ctrl+S`.
    pub fn register_chord(
        &mut self,
        first: KeyCombination,
        second: KeyCombination,
        command: Option<CommandId>,
        group: &str,
        title: &str,
        disable_modes: &str,
    ) {
        let keys = KeySequence::from(vec![first, second]);
        self.register(keys, command, group, title, disable_modes);
    }

    pub fn keymap(&self, map_type: KeyMapType) -> &KeyMap {
        &self.keymaps[map_type.index()]
    }

    pub fn keymap_mut(&mut self, map_type: KeyMapType) -> &mut KeyMap {
        &mut self.keymaps[map_type.index()]
    }

    /// Add a keymap category consulted after all built-in maps.
    pub fn push_matcher(&mut self, matcher: Box<dyn KeyMatcher>) {
        self.matchers.push(matcher);
    }

    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    /// Shortcuts to show in help surfaces for the current editor mode.
    pub fn active_shortcut_info(&self) -> Vec<&ShortcutInfo> {
        self.shortcuts.active(self.editor_mode)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Key handling
    // ─────────────────────────────────────────────────────────────────────

    /// Keys typed so far towards a chord.
    pub fn pending_keys(&self) -> &KeySequence {
        &self.key_buffer
    }

    pub fn clear_key_buffer(&mut self) {
        if !self.key_buffer.is_empty() {
            tracing::trace!("Clearing key buffer ({})", self.key_buffer);
            self.key_buffer.clear();
        }
    }

    /// Host entry point for a key-down event.
    ///
    /// Cancels the event when a shortcut ran and reports the execution on
    /// the event channel. Save/close keys (`Ctrl+S`/`Ctrl+W`, `Cmd` on
    /// macOS) always get their default action prevented.
    pub fn on_key_down(&mut self, event: &mut KeyDown, now: Instant) -> KeyOutcome {
        if event.is_canceled() {
            return KeyOutcome::Unhandled;
        }

        let outcome = self.handle_key_down(event.key(), now);
        if outcome.is_handled() {
            event.cancel();
        }
        if self.is_reserved(&event.key()) {
            event.prevent_default();
        }
        outcome
    }

    /// Feed one keystroke. Restarts the idle timer.
    pub fn handle_key_down(&mut self, key: KeyCombination, now: Instant) -> KeyOutcome {
        self.poll_timer(now);
        self.timer.schedule(now);
        self.dispatch_key(key)
    }

    /// Drop the key buffer if the idle timer has run out. Returns true when
    /// the timer fired.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        if self.timer.take_expired(now) {
            self.clear_key_buffer();
            true
        } else {
            false
        }
    }

    /// An embedded editor handled a keystroke itself. Unless that keystroke
    /// was part of a chord, any chord in progress is abandoned.
    pub fn on_editor_activity(&mut self, chain: bool) {
        if !chain {
            self.clear_key_buffer();
        }
    }

    fn dispatch_key(&mut self, key: KeyCombination) -> KeyOutcome {
        // Escape always abandons a chord, even while dispatch is suspended
        if key.is_escape() {
            self.clear_key_buffer();
            return KeyOutcome::Unhandled;
        }

        if !self.is_enabled() {
            return KeyOutcome::Unhandled;
        }

        if key.is_modifier_key() {
            return KeyOutcome::Unhandled;
        }

        self.key_buffer.add(key);

        let (binding, pending) = self.find_binding();

        if let Some(binding) = binding {
            let keys = std::mem::take(&mut self.key_buffer);
            return self.execute(binding, keys);
        }

        if !pending {
            self.clear_key_buffer();
        }

        // A keypress without modifiers ends any chord. Otherwise the buffer
        // goes stale whenever an embedded editor consumes a key without
        // telling us.
        if self.options.clear_unmodified
            && self.key_buffer.last().is_some_and(KeyCombination::is_unmodified)
        {
            self.clear_key_buffer();
        }

        if self.key_buffer.is_empty() {
            KeyOutcome::Unhandled
        } else {
            tracing::debug!("Pending chord: {}", self.key_buffer);
            KeyOutcome::Pending
        }
    }

    /// First active binding for the buffer across all matchers, and whether
    /// any matcher consulted before it reported the buffer as a prefix.
    fn find_binding(&self) -> (Option<CommandBinding>, bool) {
        let ctx = ActivationContext::new(self.editor_mode, &self.commands);
        let builtin = self.keymaps.iter().map(|m| m as &dyn KeyMatcher);
        let extra = self.matchers.iter().map(|m| m.as_ref() as &dyn KeyMatcher);

        let mut pending = false;
        for matcher in builtin.chain(extra) {
            if let Some(binding) = matcher.active_binding(&self.key_buffer, &ctx) {
                return (Some(binding.clone()), pending);
            }
            if matcher.is_prefix(&self.key_buffer) {
                pending = true;
            }
        }
        (None, pending)
    }

    fn execute(&mut self, binding: CommandBinding, keys: KeySequence) -> KeyOutcome {
        tracing::debug!("{} -> {}", keys, binding.command);

        if let Err(e) = self.commands.execute(&binding.command) {
            tracing::warn!("Command '{}' failed: {:#}", binding.command, e);
        }

        if binding.record {
            send_or_log(
                &self.events,
                ShortcutEvent::CommandExecuted {
                    command: binding.command.clone(),
                    keys,
                },
                "shortcut event",
            );
        }

        KeyOutcome::Handled(binding.command)
    }

    /// Save and close keys that must never reach the host's own handlers.
    fn is_reserved(&self, key: &KeyCombination) -> bool {
        matches!(key.code(), KeyCode::Char('s') | KeyCode::Char('w'))
            && key.modifiers() == self.options.platform.command_modifier()
    }
}
