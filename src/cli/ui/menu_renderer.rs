use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    style::{Attribute, SetAttribute},
    terminal::{self, ClearType},
    ExecutableCommand,
};

use crate::cli::ui::formatting::Formatter;
use crate::cli::ui::test_mode::{self, MenuTestEvent};

const PAGE_STEP: usize = 3;

#[derive(Clone, Debug)]
pub struct MenuUI {
    pub title: String,
    pub context: Option<String>,
    pub items: Vec<MenuUIItem>,
    pub initial_index: Option<usize>,
}

impl MenuUI {
    pub fn new(title: impl Into<String>, items: Vec<MenuUIItem>) -> Self {
        Self {
            title: title.into(),
            context: None,
            items,
            initial_index: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        if !context.trim().is_empty() {
            self.context = Some(context);
        }
        self
    }

    pub fn with_initial_index(mut self, index: usize) -> Self {
        self.initial_index = Some(index);
        self
    }

    /// Starts on the item whose key equals `key`, if present.
    pub fn with_initial_key(self, key: Option<&str>) -> Self {
        let index = key.and_then(|key| self.items.iter().position(|item| item.key == key));
        match index {
            Some(index) => self.with_initial_index(index),
            None => self,
        }
    }

    fn start_index(&self) -> usize {
        self.initial_index
            .unwrap_or(0)
            .min(self.items.len().saturating_sub(1))
    }
}

#[derive(Clone, Debug)]
pub struct MenuUIItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl MenuUIItem {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug)]
pub enum MenuRenderError {
    Interrupted,
    Io(io::Error),
}

impl From<io::Error> for MenuRenderError {
    fn from(err: io::Error) -> Self {
        MenuRenderError::Io(err)
    }
}

#[derive(Clone, Copy)]
enum Move {
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

fn move_selection(index: usize, len: usize, movement: Move) -> usize {
    match movement {
        Move::Up => index.checked_sub(1).unwrap_or(len - 1),
        Move::Down => (index + 1) % len,
        Move::Home => 0,
        Move::End => len - 1,
        Move::PageUp => index.saturating_sub(PAGE_STEP),
        Move::PageDown => (index + PAGE_STEP).min(len - 1),
    }
}

/// Arrow-key menu drawn in raw mode; returns the chosen item key or `None` on ESC.
#[derive(Default)]
pub struct MenuRenderer {
    formatter: Formatter,
}

impl MenuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, menu: &MenuUI) -> Result<Option<String>, MenuRenderError> {
        if menu.items.is_empty() {
            return Ok(None);
        }

        if let Some(events) = test_mode::next_menu_events(&menu.title) {
            return Ok(self.show_with_script(menu, events));
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.execute(cursor::Hide)?;

        let len = menu.items.len();
        let mut selected = menu.start_index();
        let result = loop {
            self.render(&mut stdout, menu, selected)?;
            let key = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            {
                break Err(MenuRenderError::Interrupted);
            }
            let movement = match key.code {
                KeyCode::Up => Move::Up,
                KeyCode::Down => Move::Down,
                KeyCode::Home => Move::Home,
                KeyCode::End => Move::End,
                KeyCode::PageUp => Move::PageUp,
                KeyCode::PageDown => Move::PageDown,
                KeyCode::Enter => break Ok(Some(menu.items[selected].key.clone())),
                KeyCode::Esc => break Ok(None),
                _ => continue,
            };
            selected = move_selection(selected, len, movement);
        };

        let clear_status = clear_screen(&mut stdout);
        stdout.execute(cursor::Show).ok();
        terminal::disable_raw_mode().ok();
        clear_status?;

        result
    }

    /// Replays scripted keys and prints the final menu state.
    ///
    /// # Panics
    /// When the script ends without ENTER or ESC.
    fn show_with_script(&self, menu: &MenuUI, events: Vec<MenuTestEvent>) -> Option<String> {
        let len = menu.items.len();
        let mut selected = menu.start_index();
        for event in events {
            let movement = match event {
                MenuTestEvent::Up => Move::Up,
                MenuTestEvent::Down => Move::Down,
                MenuTestEvent::Home => Move::Home,
                MenuTestEvent::End => Move::End,
                MenuTestEvent::PageUp => Move::PageUp,
                MenuTestEvent::PageDown => Move::PageDown,
                MenuTestEvent::Enter => {
                    self.print_snapshot(menu, selected);
                    return Some(menu.items[selected].key.clone());
                }
                MenuTestEvent::Esc => {
                    self.print_snapshot(menu, selected);
                    return None;
                }
            };
            selected = move_selection(selected, len, movement);
        }
        self.print_snapshot(menu, selected);
        panic!(
            "Scripted menu events must end with ENTER or ESC for `{}`",
            menu.title
        );
    }

    fn lines(&self, menu: &MenuUI, selected: usize) -> Vec<(bool, String)> {
        let width = menu
            .items
            .iter()
            .map(|item| item.label.chars().count())
            .max()
            .unwrap_or(0);
        menu.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let is_selected = index == selected;
                let pointer = if is_selected { self.formatter.pointer() } else { " " };
                let row = self
                    .formatter
                    .format_two_column_row(&item.label, &item.description, width);
                (is_selected, format!(" {pointer} {row}"))
            })
            .collect()
    }

    fn print_snapshot(&self, menu: &MenuUI, selected: usize) {
        if let Some(context) = &menu.context {
            println!("{}", self.formatter.detail_text(context));
            println!();
        }
        println!("{}", self.formatter.header_text(&menu.title));
        for (_, line) in self.lines(menu, selected) {
            println!("{line}");
        }
        println!();
    }

    fn render(&self, stdout: &mut Stdout, menu: &MenuUI, selected: usize) -> io::Result<()> {
        clear_screen(stdout)?;
        if let Some(context) = &menu.context {
            for line in context.lines() {
                write!(stdout, "{}\r\n", self.formatter.detail_text(line))?;
            }
            write!(stdout, "\r\n")?;
        }
        write!(stdout, "{}\r\n\r\n", self.formatter.header_text(&menu.title))?;

        for (is_selected, line) in self.lines(menu, selected) {
            if is_selected {
                stdout.execute(SetAttribute(Attribute::Reverse))?;
            }
            write!(stdout, "{line}")?;
            stdout.execute(SetAttribute(Attribute::Reset))?;
            write!(stdout, "\r\n")?;
        }

        write!(
            stdout,
            "\r\n{}\r\n",
            self.formatter.detail_text(self.formatter.navigation_hint())
        )?;
        stdout.flush()
    }
}

fn clear_screen(stdout: &mut Stdout) -> io::Result<()> {
    stdout.execute(terminal::Clear(ClearType::All))?;
    stdout.execute(cursor::MoveTo(0, 0))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_vertically_and_clamps_on_pages() {
        assert_eq!(move_selection(0, 4, Move::Up), 3);
        assert_eq!(move_selection(3, 4, Move::Down), 0);
        assert_eq!(move_selection(2, 4, Move::PageDown), 3);
        assert_eq!(move_selection(2, 4, Move::PageUp), 0);
        assert_eq!(move_selection(1, 4, Move::End), 3);
    }

    #[test]
    fn initial_key_selects_matching_item() {
        let menu = MenuUI::new(
            "Service",
            vec![
                MenuUIItem::new("wrapping", "Wrapping", ""),
                MenuUIItem::new("ppf", "PPF", ""),
            ],
        )
        .with_initial_key(Some("ppf"));
        assert_eq!(menu.start_index(), 1);
    }
}
