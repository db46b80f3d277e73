//! keychord - keyboard shortcut dispatch for terminal applications
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod keybindings;
pub mod tui;
pub mod util;
