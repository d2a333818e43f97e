use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    /// ASCII markers, no colors.
    pub plain_mode: bool,
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
    if prefs.plain_mode {
        colored::control::set_override(false);
    }
}

pub fn current_preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn build_label(kind: MessageKind, plain: bool) -> &'static str {
    match (kind, plain) {
        (MessageKind::Info, _) => "",
        (MessageKind::Success, false) => "✔ ",
        (MessageKind::Success, true) => "OK: ",
        (MessageKind::Warning, false) => "⚠ ",
        (MessageKind::Warning, true) => "WARNING: ",
        (MessageKind::Error, false) => "✖ ",
        (MessageKind::Error, true) => "ERROR: ",
        (MessageKind::Section, _) => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}{}", build_label(kind, prefs.plain_mode), text),
    };

    if prefs.plain_mode {
        return formatted;
    }

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn styled(kind: MessageKind, message: impl fmt::Display) -> String {
    apply_style(kind, message, &current_preferences())
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = styled(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

pub fn blank_line() {
    println!();
}
