use crate::keybindings::{
    try_parse_disable_modes, CommandBinding, CommandId, CommandRegistry, DispatchOptions,
    EditorMode, KeyMapType, KeySequence, ShortcutDispatcher,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_chord_timeout_ms")]
    pub chord_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub clear_unmodified: bool,
    #[serde(default)]
    pub editor_mode: EditorMode,
}

fn default_chord_timeout_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            chord_timeout_ms: default_chord_timeout_ms(),
            clear_unmodified: true,
            editor_mode: EditorMode::default(),
        }
    }
}

/// A user binding from the `[[bindings]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Key sequence, e.g. "Ctrl+X Ctrl+S"
    pub keys: String,
    /// Command to run. Omit to document a shortcut handled elsewhere.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub title: String,
    /// Comma-separated editor modes in which the binding is off
    #[serde(default)]
    pub disable_modes: String,
    #[serde(default = "default_map")]
    pub map: KeyMapType,
}

fn default_map() -> KeyMapType {
    KeyMapType::Application
}

impl Config {
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            chord_timeout: Duration::from_millis(self.dispatch.chord_timeout_ms),
            clear_unmodified: self.dispatch.clear_unmodified,
            ..DispatchOptions::default()
        }
    }

    /// Install the configured bindings. Application bindings go through the
    /// normal registration path so they show up in help; editor and add-in
    /// bindings go straight into their keymap.
    ///
    /// Invalid entries are logged and skipped. Returns how many were applied.
    pub fn apply_bindings<R: CommandRegistry>(&self, dispatcher: &mut ShortcutDispatcher<R>) -> usize {
        let mut applied = 0;
        for binding in &self.bindings {
            match binding.apply(dispatcher) {
                Ok(()) => applied += 1,
                Err(e) => tracing::warn!("Skipping binding '{}': {:#}", binding.keys, e),
            }
        }
        applied
    }
}

impl BindingConfig {
    fn apply<R: CommandRegistry>(&self, dispatcher: &mut ShortcutDispatcher<R>) -> Result<()> {
        let keys: KeySequence = self
            .keys
            .parse()
            .with_context(|| format!("invalid key sequence '{}'", self.keys))?;
        let modes = try_parse_disable_modes(&self.disable_modes)?;
        let command = self.command.as_deref().map(CommandId::from);

        match (self.map, command) {
            (KeyMapType::Application, command) => {
                dispatcher.register_with_modes(keys, command, &self.group, &self.title, modes);
            }
            (map, Some(command)) => {
                dispatcher
                    .keymap_mut(map)
                    .add_binding(&keys, CommandBinding::new(command).disabled_in(modes));
            }
            (map, None) => {
                anyhow::bail!("{:?} bindings need a command", map);
            }
        }
        Ok(())
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "keychord")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration. A missing file at the default location means "no
/// customization"; a missing file that was asked for explicitly is an error.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                tracing::debug!("No config at {}, using defaults", p.display());
                return Ok(Config::default());
            }
            p
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

const TEMPLATE: &str = r#"# keychord configuration

[dispatch]
# Idle time before a half-typed chord is dropped
chord_timeout_ms = 3000
# Drop the chord buffer after any key without modifiers
clear_unmodified = true
# default | vim | emacs
editor_mode = "default"

# [[bindings]]
# keys = "Ctrl+X Ctrl+S"
# command = "save"
# group = "File"
# title = "Save"
# disable_modes = "default,vim"
# map = "application"     # application | editor | addin
"#;

/// Write a commented template config to `path` (or the default location).
pub fn init(path: Option<&Path>, overwrite: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if config_path.exists() && !overwrite {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&config_path, TEMPLATE)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = parse(TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_binding_defaults() {
        let config = parse(
            r#"
            [[bindings]]
            keys = "Ctrl+K"
            "#,
        )
        .unwrap();
        let binding = &config.bindings[0];
        assert_eq!(binding.map, KeyMapType::Application);
        assert!(binding.command.is_none());
        assert!(binding.disable_modes.is_empty());
    }

    #[test]
    fn test_dispatch_options() {
        let config = parse(
            r#"
            [dispatch]
            chord_timeout_ms = 750
            clear_unmodified = false
            editor_mode = "emacs"
            "#,
        )
        .unwrap();
        let options = config.dispatch_options();
        assert_eq!(options.chord_timeout, Duration::from_millis(750));
        assert!(!options.clear_unmodified);
        assert_eq!(config.dispatch.editor_mode, EditorMode::Emacs);
    }

    #[test]
    fn test_unknown_editor_mode_rejected() {
        assert!(parse("[dispatch]\neditor_mode = \"nano\"\n").is_err());
    }
}
