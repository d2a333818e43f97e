use std::fmt;

use colored::Colorize;

use crate::cli::output::{current_preferences, OutputPreferences};

/// Shared text styling for menus and screens.
pub struct Formatter {
    prefs: OutputPreferences,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            prefs: current_preferences(),
        }
    }

    pub fn header_text(&self, title: impl fmt::Display) -> String {
        let text = format!("=== {} ===", title);
        if self.prefs.plain_mode {
            text
        } else {
            text.bold().to_string()
        }
    }

    pub fn detail_text(&self, message: impl fmt::Display) -> String {
        if self.prefs.plain_mode {
            message.to_string()
        } else {
            message.to_string().dimmed().to_string()
        }
    }

    pub fn pointer(&self) -> &'static str {
        if self.prefs.plain_mode {
            ">"
        } else {
            "▸"
        }
    }

    pub fn navigation_hint(&self) -> &'static str {
        "(Use arrow keys to navigate, Enter to select, ESC to go back)"
    }

    pub fn format_two_column_row(&self, label: &str, description: &str, width: usize) -> String {
        if description.is_empty() {
            return label.to_string();
        }
        format!("{:<width$}  {}", label, description, width = width + 2)
    }

    /// Renders `(label, value)` pairs aligned on the label column.
    pub fn key_value_block(&self, entries: &[(&str, String)]) -> String {
        let width = entries
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        entries
            .iter()
            .map(|(label, value)| format!("  {:<width$}  {}", label, value, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
