mod defaults;

pub use defaults::{
    host_commands, register_defaults, DefaultShortcut, HostRequests, SharedRequests,
    DEFAULT_SHORTCUTS,
};

use crate::config::Config;
use crate::keybindings::{
    generate_help, shortcut_rows, CommandTable, DisableHandle, EditorMode, KeyDown, KeyOutcome,
    ShortcutDispatcher, ShortcutEvent,
};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Build a dispatcher with the built-in shortcuts and the user's bindings.
pub fn build_dispatcher(
    config: &Config,
    requests: &SharedRequests,
    events: mpsc::UnboundedSender<ShortcutEvent>,
) -> Result<ShortcutDispatcher<CommandTable>> {
    let mut dispatcher =
        ShortcutDispatcher::new(host_commands(requests), events, config.dispatch_options());
    register_defaults(&mut dispatcher)?;
    let applied = config.apply_bindings(&mut dispatcher);
    tracing::debug!("Applied {} configured bindings", applied);
    dispatcher.set_editor_mode(config.dispatch.editor_mode);
    Ok(dispatcher)
}

/// Print the shortcuts active in the configured (or given) editor mode,
/// as aligned help text or as JSON.
pub fn list(config: &Config, mode: Option<EditorMode>, json: bool) -> Result<()> {
    let requests = SharedRequests::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut dispatcher = build_dispatcher(config, &requests, tx)?;
    if let Some(mode) = mode {
        dispatcher.set_editor_mode(mode);
    }

    let active = dispatcher.active_shortcut_info();
    if json {
        println!("{}", serde_json::to_string_pretty(&shortcut_rows(&active))?);
    } else {
        for line in generate_help(&active) {
            println!("{}", line);
        }
    }
    Ok(())
}

pub async fn run(config: Config, mode: Option<EditorMode>) -> Result<()> {
    // Check if stdin is a terminal
    if !std::io::IsTerminal::is_terminal(&io::stdin()) {
        anyhow::bail!("keychord requires an interactive terminal");
    }

    let requests = SharedRequests::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut dispatcher = build_dispatcher(&config, &requests, tx)?;
    if let Some(mode) = mode {
        dispatcher.set_editor_mode(mode);
    }

    enable_raw_mode()?;
    let result = run_loop(&mut dispatcher, &requests, &mut rx);
    disable_raw_mode()?;

    result
}

/// Print a line while the terminal is in raw mode.
fn say(line: impl AsRef<str>) -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}\r\n", line.as_ref())?;
    stdout.flush()?;
    Ok(())
}

fn run_loop(
    dispatcher: &mut ShortcutDispatcher<CommandTable>,
    requests: &SharedRequests,
    rx: &mut mpsc::UnboundedReceiver<ShortcutEvent>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut overlay: Option<DisableHandle> = None;

    say(format!(
        "keychord: {} mode. F1 lists shortcuts, Ctrl+Q quits.",
        dispatcher.editor_mode()
    ))?;

    loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let Some(mut down) = KeyDown::from_event(key) {
                    let outcome = dispatcher.on_key_down(&mut down, Instant::now());
                    match outcome {
                        KeyOutcome::Handled(_) => {}
                        KeyOutcome::Pending => {
                            say(format!("  {} …", dispatcher.pending_keys()))?;
                        }
                        KeyOutcome::Unhandled => {
                            if down.key().code() == KeyCode::Esc {
                                if let Some(mut handle) = overlay.take() {
                                    handle.close();
                                    say("  overlay closed, shortcuts resumed")?;
                                }
                            } else if key.code == KeyCode::Char('c')
                                && key.modifiers.contains(KeyModifiers::CONTROL)
                            {
                                return Ok(());
                            } else if !down.key().is_modifier_key() {
                                say(format!("  {} (not a shortcut)", down.key()))?;
                            }
                        }
                    }
                }
            }
        }

        // Handle chord timeout (non-blocking)
        if dispatcher.poll_timer(Instant::now()) {
            tracing::debug!("Chord timed out");
        }

        while let Ok(ShortcutEvent::CommandExecuted { command, keys }) = rx.try_recv() {
            say(format!("▶ {} ({})", command, keys))?;
        }

        let pending = std::mem::take(&mut *requests.borrow_mut());
        if pending.quit {
            return Ok(());
        }
        if let Some(mode) = pending.editor_mode {
            dispatcher.set_editor_mode(mode);
            say(format!("  switched to {} mode", mode))?;
        }
        if pending.show_help {
            for line in generate_help(&dispatcher.active_shortcut_info()) {
                say(line)?;
            }
        }
        if pending.open_overlay && overlay.is_none() {
            overlay = Some(dispatcher.disable());
            say("  overlay open: shortcuts suspended, Esc closes")?;
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}
