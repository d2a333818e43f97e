use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
    ExecutableCommand,
};

use crate::cli::ui::menu_renderer::{MenuRenderError, MenuRenderer, MenuUI, MenuUIItem};
use crate::cli::ui::test_mode::{self, TextTestInput};

pub const BACK_KEY: &str = "__BACK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPromptResult {
    Value(String),
    Keep,
    Back,
    Help,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoicePromptResult {
    Value(String),
    Back,
    Cancel,
}

/// Reads one line. Blank input keeps `default` when there is one.
pub fn text_input(label: &str, default: Option<&str>) -> io::Result<TextPromptResult> {
    let hint = default
        .filter(|value| !value.is_empty())
        .map(|value| format!(" [{value}]"))
        .unwrap_or_default();

    if let Some(scripted) = test_mode::next_text_input(label) {
        let result = match scripted {
            TextTestInput::Value(value) => interpret_buffer(&value, default),
            TextTestInput::Keep => TextPromptResult::Keep,
            TextTestInput::Back | TextTestInput::Escape => TextPromptResult::Back,
            TextTestInput::Help => TextPromptResult::Help,
            TextTestInput::Cancel => TextPromptResult::Cancel,
        };
        let echo = match &result {
            TextPromptResult::Value(value) => value.clone(),
            TextPromptResult::Keep => default.unwrap_or_default().to_string(),
            _ => String::new(),
        };
        println!("{label}{hint}: {echo}");
        return Ok(result);
    }

    println!("{label}{hint}");
    let mut guard = RawModeGuard::activate()?;
    let mut stdout = io::stdout();
    redraw_input(&mut stdout, "")?;
    let mut buffer = String::new();

    loop {
        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    guard.deactivate();
                    println!();
                    return Ok(TextPromptResult::Cancel);
                }
                KeyCode::Char('u') | KeyCode::Char('U') => {
                    buffer.clear();
                    redraw_input(&mut stdout, &buffer)?;
                    continue;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => {
                guard.deactivate();
                println!();
                return Ok(TextPromptResult::Back);
            }
            KeyCode::Enter => {
                guard.deactivate();
                println!();
                return Ok(interpret_buffer(&buffer, default));
            }
            KeyCode::Backspace => {
                buffer.pop();
                redraw_input(&mut stdout, &buffer)?;
            }
            KeyCode::Char(ch) => {
                buffer.push(ch);
                redraw_input(&mut stdout, &buffer)?;
            }
            _ => {}
        }
    }
}

/// Shows `items` as a menu, optionally followed by a back entry. ESC also goes back.
pub fn choice_menu(
    title: &str,
    context: &str,
    mut items: Vec<MenuUIItem>,
    current: Option<&str>,
    enable_back: bool,
) -> io::Result<ChoicePromptResult> {
    if enable_back {
        items.push(MenuUIItem::new(BACK_KEY, "← Back", "Return to the previous question"));
    }
    let menu = MenuUI::new(title, items)
        .with_context(context)
        .with_initial_key(current);

    match MenuRenderer::new().show(&menu) {
        Ok(Some(key)) if key == BACK_KEY => Ok(ChoicePromptResult::Back),
        Ok(Some(key)) => Ok(ChoicePromptResult::Value(key)),
        Ok(None) => Ok(ChoicePromptResult::Back),
        Err(MenuRenderError::Interrupted) => Ok(ChoicePromptResult::Cancel),
        Err(MenuRenderError::Io(err)) => Err(err),
    }
}

fn redraw_input(stdout: &mut Stdout, buffer: &str) -> io::Result<()> {
    stdout.execute(cursor::MoveToColumn(0))?;
    stdout.execute(terminal::Clear(ClearType::CurrentLine))?;
    write!(stdout, "> {}", buffer)?;
    stdout.flush()
}

fn interpret_buffer(buffer: &str, default: Option<&str>) -> TextPromptResult {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return if default.is_some_and(|value| !value.is_empty()) {
            TextPromptResult::Keep
        } else {
            TextPromptResult::Value(String::new())
        };
    }

    match trimmed.to_ascii_lowercase().as_str() {
        ":cancel" => TextPromptResult::Cancel,
        ":back" => TextPromptResult::Back,
        ":help" => TextPromptResult::Help,
        ":clear" => TextPromptResult::Value(String::new()),
        _ => TextPromptResult::Value(trimmed.to_string()),
    }
}

pub(crate) struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub(crate) fn activate() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }

    pub(crate) fn deactivate(&mut self) {
        if self.active {
            let _ = terminal::disable_raw_mode();
            self.active = false;
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_keeps_existing_value_only() {
        assert_eq!(interpret_buffer("  ", Some("Ali")), TextPromptResult::Keep);
        assert_eq!(
            interpret_buffer("", None),
            TextPromptResult::Value(String::new())
        );
        assert_eq!(
            interpret_buffer("", Some("")),
            TextPromptResult::Value(String::new())
        );
    }

    #[test]
    fn colon_commands_are_recognized() {
        assert_eq!(interpret_buffer(":BACK", None), TextPromptResult::Back);
        assert_eq!(interpret_buffer(":clear", Some("x")), TextPromptResult::Value(String::new()));
        assert_eq!(interpret_buffer(":cancel", None), TextPromptResult::Cancel);
        assert_eq!(
            interpret_buffer("  Matte black ", None),
            TextPromptResult::Value("Matte black".into())
        );
    }
}
