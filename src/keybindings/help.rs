//! Help text generated from the active shortcut list.

use super::registry::ShortcutInfo;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// Minimum width of the keys column.
const KEYS_COLUMN: usize = 14;

/// One line of a shortcut listing, in a form suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortcutRow {
    pub keys: String,
    pub group: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl From<&ShortcutInfo> for ShortcutRow {
    fn from(info: &ShortcutInfo) -> Self {
        Self {
            keys: info.shortcut.keys().to_string(),
            group: info.shortcut.group().to_string(),
            description: info.description(),
            command: info.command.as_ref().map(|c| c.to_string()),
        }
    }
}

pub fn shortcut_rows(shortcuts: &[&ShortcutInfo]) -> Vec<ShortcutRow> {
    shortcuts.iter().map(|info| ShortcutRow::from(*info)).collect()
}

/// Generate help lines, with a header each time the group changes.
///
/// Shortcuts stay in the order given; a group that appears twice with other
/// groups in between gets two headers.
pub fn generate_help(shortcuts: &[&ShortcutInfo]) -> Vec<String> {
    let rows = shortcut_rows(shortcuts);
    let keys_width = rows
        .iter()
        .map(|row| row.keys.width())
        .max()
        .unwrap_or(0)
        .max(KEYS_COLUMN);

    let mut lines = Vec::new();
    let mut current_group: Option<&str> = None;

    for row in &rows {
        if current_group != Some(row.group.as_str()) {
            if current_group.is_some() {
                lines.push(String::new());
            }
            let label = if row.group.is_empty() { "Other" } else { row.group.as_str() };
            lines.push(format!("  {}", label));
            lines.push(format!("  {}", "─".repeat(label.width())));
            current_group = Some(row.group.as_str());
        }

        let padding = " ".repeat(keys_width - row.keys.width() + 2);
        lines.push(format!("  {}{}{}", row.keys, padding, row.description));
    }

    lines
}
