//! Editor keybinding modes and the "disable modes" mask.

use super::keys::ParseError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Set of editor modes in which a binding is switched off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModeMask: u8 {
        const DEFAULT = 1 << 0;
        const VIM = 1 << 1;
        const EMACS = 1 << 2;
    }
}

/// The keybinding emulation the editor is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Default,
    Vim,
    Emacs,
}

impl EditorMode {
    pub fn mask(self) -> ModeMask {
        match self {
            EditorMode::Default => ModeMask::DEFAULT,
            EditorMode::Vim => ModeMask::VIM,
            EditorMode::Emacs => ModeMask::EMACS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditorMode::Default => "default",
            EditorMode::Vim => "vim",
            EditorMode::Emacs => "emacs",
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EditorMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(EditorMode::Default),
            "vim" => Ok(EditorMode::Vim),
            "emacs" => Ok(EditorMode::Emacs),
            other => Err(ParseError::UnknownMode(other.to_string())),
        }
    }
}

impl ModeMask {
    /// True when a binding carrying this mask may run in `mode`.
    pub fn allows(self, mode: EditorMode) -> bool {
        !self.intersects(mode.mask())
    }
}

/// Parse a comma-separated mode list (`"vim,emacs"`) into a mask.
///
/// Mode lists are written by developers alongside command definitions, so an
/// unknown token is a programming error: it trips a debug assertion and is
/// ignored in release builds.
pub fn parse_disable_modes(text: &str) -> ModeMask {
    match try_parse_disable_modes(text) {
        Ok(mask) => mask,
        Err(e) => {
            debug_assert!(false, "{}", e);
            tracing::warn!("Ignoring disable modes '{}': {}", text, e);
            ModeMask::empty()
        }
    }
}

/// Parse a comma-separated mode list, reporting unknown tokens.
///
/// Used for user configuration, where a typo should be reported rather than
/// asserted on.
pub fn try_parse_disable_modes(text: &str) -> Result<ModeMask, ParseError> {
    let mut mask = ModeMask::empty();
    for item in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        mask |= item.parse::<EditorMode>()?.mask();
    }
    Ok(mask)
}
