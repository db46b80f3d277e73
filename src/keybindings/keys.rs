//! Key combinations and key sequences.
//!
//! A `KeyCombination` is one keystroke (key code plus held modifiers). A
//! `KeySequence` is an ordered list of them and doubles as the dispatcher's
//! key buffer and as the path into a keymap trie.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing key or mode descriptions from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("key description is empty")]
    Empty,
    #[error("key description '{0}' has only modifiers")]
    MissingKey(String),
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("unrecognized disable mode '{0}'")]
    UnknownMode(String),
}

/// A single keystroke: key code plus modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyCombination {
    /// Build a combination, normalizing how shifted characters are reported.
    ///
    /// Terminals disagree on whether `G` arrives as `Char('G')`, `Char('G')`
    /// with SHIFT, or `Char('g')` with SHIFT. Letters are stored upper-cased
    /// with SHIFT; other characters drop SHIFT since the char already
    /// carries it (`?` rather than `Shift+/`).
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let (code, modifiers) = match code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                if c.is_ascii_uppercase() || modifiers.contains(KeyModifiers::SHIFT) {
                    (
                        KeyCode::Char(c.to_ascii_uppercase()),
                        modifiers | KeyModifiers::SHIFT,
                    )
                } else {
                    (code, modifiers)
                }
            }
            KeyCode::Char(_) => (code, modifiers.difference(KeyModifiers::SHIFT)),
            // BackTab is what terminals send for Shift+Tab
            KeyCode::BackTab => (KeyCode::Tab, modifiers | KeyModifiers::SHIFT),
            _ => (code, modifiers),
        };
        Self { code, modifiers }
    }

    /// A combination without modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    /// True when no modifier key is held.
    pub fn is_unmodified(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// True for a press of a modifier key on its own (Shift, Ctrl, ...).
    pub fn is_modifier_key(&self) -> bool {
        matches!(self.code, KeyCode::Modifier(_))
    }

    pub fn is_escape(&self) -> bool {
        self.code == KeyCode::Esc
    }

    /// True when the combination uses the Super/Meta (command) modifier.
    pub fn uses_meta(&self) -> bool {
        self.modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META)
    }
}

impl From<KeyEvent> for KeyCombination {
    fn from(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        if self.uses_meta() {
            f.write_str("Cmd+")?;
        }
        f.write_str(&format_keycode(&self.code))
    }
}

impl FromStr for KeyCombination {
    type Err = ParseError;

    /// Parse `Mod+Mod+Key`, e.g. `Ctrl+Shift+P`, `Alt+Enter`, `F5`, `?`.
    ///
    /// `Ctrl+X` and `Ctrl+x` are the same combination; write `Shift+G`
    /// for an upper-case G.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        // A trailing "++" means the key itself is '+'
        let (mods_part, key_part) = if let Some(stripped) = s.strip_suffix("++") {
            (stripped, "+")
        } else if s == "+" {
            ("", "+")
        } else {
            match s.rsplit_once('+') {
                Some((mods, key)) => (mods, key),
                None => ("", s),
            }
        };

        if key_part.is_empty() {
            return Err(ParseError::MissingKey(s.to_string()));
        }

        let mut modifiers = KeyModifiers::NONE;
        for part in mods_part.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "ctl" => KeyModifiers::CONTROL,
                "alt" | "opt" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                "cmd" | "command" | "super" | "meta" => KeyModifiers::SUPER,
                _ => return Err(ParseError::UnknownModifier(part.to_string())),
            };
        }

        let code = parse_keycode(key_part)?;
        Ok(Self::new(code, modifiers))
    }
}

/// Format a KeyCode for display.
fn format_keycode(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", code),
    }
}

fn parse_keycode(name: &str) -> Result<KeyCode, ParseError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(match c {
            '↑' => KeyCode::Up,
            '↓' => KeyCode::Down,
            '←' => KeyCode::Left,
            '→' => KeyCode::Right,
            // Letters are case-insensitive in text; Shift must be spelled out
            _ => KeyCode::Char(c.to_ascii_lowercase()),
        });
    }

    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        "plus" => KeyCode::Char('+'),
        _ => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n) if (1..=24).contains(&n) => KeyCode::F(n),
            _ => return Err(ParseError::UnknownKey(name.to_string())),
        },
    };
    Ok(code)
}

/// An ordered list of key combinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence {
    keys: Vec<KeyCombination>,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// A one-key sequence.
    pub fn single(key: KeyCombination) -> Self {
        Self { keys: vec![key] }
    }

    pub fn add(&mut self, key: KeyCombination) {
        self.keys.push(key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KeyCombination> {
        self.keys.get(index)
    }

    pub fn last(&self) -> Option<&KeyCombination> {
        self.keys.last()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyCombination> {
        self.keys.iter()
    }

    pub fn uses_meta(&self) -> bool {
        self.keys.iter().any(KeyCombination::uses_meta)
    }
}

impl From<Vec<KeyCombination>> for KeySequence {
    fn from(keys: Vec<KeyCombination>) -> Self {
        Self { keys }
    }
}

impl<'a> IntoIterator for &'a KeySequence {
    type Item = &'a KeyCombination;
    type IntoIter = std::slice::Iter<'a, KeyCombination>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

impl FromStr for KeySequence {
    type Err = ParseError;

    /// Parse whitespace-separated combinations, e.g. `Ctrl+X Ctrl+S`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<KeyCombination>, _>>()?;
        if keys.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(Self { keys })
    }
}
