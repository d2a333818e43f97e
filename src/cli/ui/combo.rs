//! Filterable, optionally creatable combo box.
//!
//! [`ComboState`] holds the key-handling rules and is independent of any
//! terminal. [`combo_input`] drives it from crossterm events, or from the
//! scripted text queue in test mode.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use strsim::levenshtein;

use crate::cli::ui::prompts::RawModeGuard;
use crate::cli::ui::test_mode::{self, TextTestInput};

/// Approximate rendered height of one menu row.
pub const ROW_HEIGHT: u32 = 48;
/// Menus never grow taller than this.
pub const MAX_MENU_HEIGHT: u32 = 240;

const SUGGESTION_DISTANCE: usize = 3;

pub type Validator = Box<dyn Fn(&str) -> Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboOption {
    pub label: String,
    pub value: String,
}

impl ComboOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Option whose label doubles as its value.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboOutcome {
    /// Nothing was committed.
    Pending,
    Selected(String),
    Created(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboEntry<'a> {
    Existing(&'a ComboOption),
    Create(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPlacement {
    Inline,
    BottomSheet,
}

/// Estimated menu height for `rows` entries, capped at [`MAX_MENU_HEIGHT`].
pub fn menu_height(rows: usize) -> u32 {
    let rows = u32::try_from(rows).unwrap_or(u32::MAX);
    rows.saturating_mul(ROW_HEIGHT).min(MAX_MENU_HEIGHT)
}

/// Chooses where to draw the menu for a field spanning `container_top..container_bottom`.
///
/// A bottom sheet is used only when the menu does not fit below the field
/// but does fit above it.
pub fn menu_placement(
    viewport_height: u32,
    container_top: u32,
    container_bottom: u32,
    rows: usize,
) -> MenuPlacement {
    let height = menu_height(rows);
    let space_below = viewport_height.saturating_sub(container_bottom);
    let space_above = container_top;
    if space_below < height && space_above > height {
        MenuPlacement::BottomSheet
    } else {
        MenuPlacement::Inline
    }
}

pub struct ComboState {
    options: Vec<ComboOption>,
    query: String,
    open: bool,
    highlighted: Option<usize>,
    allow_create: bool,
    validator: Option<Validator>,
    error: Option<String>,
}

impl ComboState {
    pub fn new(options: Vec<ComboOption>, allow_create: bool) -> Self {
        Self {
            options,
            query: String::new(),
            open: false,
            highlighted: None,
            allow_create,
            validator: None,
            error: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the query, reopens the menu and clears the highlight.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.open = true;
        self.highlighted = None;
        self.error = self
            .validator
            .as_ref()
            .and_then(|validate| validate(&self.query));
    }

    /// Options whose label or value contains the query, ignoring case.
    pub fn filtered(&self) -> Vec<&ComboOption> {
        let needle = self.query.to_lowercase();
        self.options
            .iter()
            .filter(|option| {
                option.label.to_lowercase().contains(&needle)
                    || option.value.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Option whose label or value equals the query, using the same case folding as [`Self::filtered`].
    pub fn exact_match(&self) -> Option<&ComboOption> {
        let needle = self.query.to_lowercase();
        self.options.iter().find(|option| {
            option.label.to_lowercase() == needle || option.value.to_lowercase() == needle
        })
    }

    pub fn shows_add_option(&self) -> bool {
        self.allow_create
            && !self.query.is_empty()
            && self.exact_match().is_none()
            && self.error.is_none()
    }

    /// Filtered options followed by the "Add" entry when it applies.
    pub fn entries(&self) -> Vec<ComboEntry<'_>> {
        let mut entries: Vec<ComboEntry<'_>> = self
            .filtered()
            .into_iter()
            .map(ComboEntry::Existing)
            .collect();
        if self.shows_add_option() {
            entries.push(ComboEntry::Create(&self.query));
        }
        entries
    }

    pub fn placement(&self, viewport_height: u32, container_top: u32, container_bottom: u32) -> MenuPlacement {
        menu_placement(
            viewport_height,
            container_top,
            container_bottom,
            self.entries().len(),
        )
    }

    pub fn handle_key(&mut self, key: ComboKey) -> ComboOutcome {
        if !self.open {
            if matches!(key, ComboKey::Down | ComboKey::Enter) {
                self.open = true;
                self.highlighted = Some(0);
            }
            return ComboOutcome::Pending;
        }

        let total = self.entries().len();
        match key {
            ComboKey::Down => {
                if total > 0 {
                    self.highlighted = Some(match self.highlighted {
                        Some(index) if index + 1 < total => index + 1,
                        _ => 0,
                    });
                }
                ComboOutcome::Pending
            }
            ComboKey::Up => {
                if total > 0 {
                    self.highlighted = Some(match self.highlighted {
                        Some(index) if index > 0 => index - 1,
                        _ => total - 1,
                    });
                }
                ComboOutcome::Pending
            }
            ComboKey::Enter => match self.highlighted {
                Some(index) => self.commit_entry(index),
                None => ComboOutcome::Pending,
            },
            ComboKey::Escape => {
                self.open = false;
                self.highlighted = None;
                ComboOutcome::Closed
            }
        }
    }

    /// Commits typed text without a highlight: an exact match wins, then a
    /// lone filtered option, then a new value when creation is allowed.
    pub fn commit_query(&mut self) -> ComboOutcome {
        if let Some(value) = self.exact_match().map(|option| option.value.clone()) {
            return self.select(value);
        }
        let filtered = self.filtered();
        if filtered.len() == 1 && !self.query.is_empty() {
            let value = filtered[0].value.clone();
            return self.select(value);
        }
        if self.shows_add_option() {
            let value = self.query.clone();
            return self.create(value);
        }
        ComboOutcome::Pending
    }

    /// Closest option label by edit distance, for "did you mean" hints.
    pub fn suggestion(&self) -> Option<&ComboOption> {
        let needle = self.query.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.options
            .iter()
            .map(|option| (levenshtein(&option.label.to_lowercase(), &needle), option))
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, option)| option)
    }

    fn commit_entry(&mut self, index: usize) -> ComboOutcome {
        let chosen = match self.entries().get(index) {
            Some(ComboEntry::Existing(option)) => Some((false, option.value.clone())),
            Some(ComboEntry::Create(query)) => Some((true, query.to_string())),
            None => None,
        };
        match chosen {
            Some((false, value)) => self.select(value),
            Some((true, value)) => self.create(value),
            None => ComboOutcome::Pending,
        }
    }

    fn select(&mut self, value: String) -> ComboOutcome {
        if let Some(option) = self.options.iter().find(|option| option.value == value) {
            self.query = option.label.clone();
        }
        self.close();
        ComboOutcome::Selected(value)
    }

    fn create(&mut self, value: String) -> ComboOutcome {
        if let Some(message) = self.validator.as_ref().and_then(|validate| validate(&value)) {
            self.error = Some(message);
            return ComboOutcome::Pending;
        }
        self.query = value.clone();
        self.close();
        ComboOutcome::Created(value)
    }

    fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }
}

/// Result of a terminal combo prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboPromptResult {
    Value(String),
    Keep,
    Back,
    Cancel,
}

/// Reads a value through `state`. `current` is kept when the input is left blank.
pub fn combo_input(
    label: &str,
    state: &mut ComboState,
    current: Option<&str>,
) -> io::Result<ComboPromptResult> {
    loop {
        if let Some(scripted) = test_mode::next_text_input(label) {
            let typed = match scripted {
                TextTestInput::Keep => return Ok(keep_or_retry(current)),
                TextTestInput::Back | TextTestInput::Escape => return Ok(ComboPromptResult::Back),
                TextTestInput::Cancel => return Ok(ComboPromptResult::Cancel),
                TextTestInput::Help => {
                    print_choices(state);
                    continue;
                }
                TextTestInput::Value(value) => value,
            };
            println!("{label}: {typed}");
            if typed.trim().is_empty() {
                if let ComboPromptResult::Keep = keep_or_retry(current) {
                    return Ok(ComboPromptResult::Keep);
                }
                println!("A value is required.");
                continue;
            }
            state.set_query(typed.trim());
            match state.commit_query() {
                ComboOutcome::Selected(value) | ComboOutcome::Created(value) => {
                    return Ok(ComboPromptResult::Value(value))
                }
                _ => report_miss(state),
            }
            continue;
        }

        return interactive(label, state, current);
    }
}

fn keep_or_retry(current: Option<&str>) -> ComboPromptResult {
    match current {
        Some(value) if !value.is_empty() => ComboPromptResult::Keep,
        _ => ComboPromptResult::Cancel,
    }
}

fn report_miss(state: &ComboState) {
    if let Some(error) = state.error() {
        println!("{error}");
        return;
    }
    match state.suggestion() {
        Some(option) => println!("No match for `{}`. Did you mean `{}`?", state.query(), option.label),
        None => println!("No match for `{}`.", state.query()),
    }
}

fn print_choices(state: &ComboState) {
    for entry in state.entries() {
        match entry {
            ComboEntry::Existing(option) => println!("  {}", option.label),
            ComboEntry::Create(query) => println!("  + Add \"{query}\""),
        }
    }
}

fn interactive(
    label: &str,
    state: &mut ComboState,
    current: Option<&str>,
) -> io::Result<ComboPromptResult> {
    let mut guard = RawModeGuard::activate()?;
    let mut stdout = io::stdout();
    state.set_query(current.unwrap_or_default());
    state.handle_key(ComboKey::Escape);
    let mut typed = false;

    let result = loop {
        render(&mut stdout, label, state)?;
        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            break ComboPromptResult::Cancel;
        }
        match key.code {
            KeyCode::Char(ch) => {
                let mut query = if typed { state.query().to_string() } else { String::new() };
                query.push(ch);
                typed = true;
                state.set_query(query);
            }
            KeyCode::Backspace => {
                let mut query = state.query().to_string();
                query.pop();
                typed = true;
                state.set_query(query);
            }
            KeyCode::Up => {
                state.handle_key(ComboKey::Up);
            }
            KeyCode::Down => {
                state.handle_key(ComboKey::Down);
            }
            KeyCode::Esc => {
                if state.is_open() {
                    state.handle_key(ComboKey::Escape);
                } else {
                    break ComboPromptResult::Back;
                }
            }
            KeyCode::Enter => {
                if !typed && state.highlighted().is_none() {
                    if let ComboPromptResult::Keep = keep_or_retry(current) {
                        break ComboPromptResult::Keep;
                    }
                }
                let outcome = if state.highlighted().is_some() {
                    state.handle_key(ComboKey::Enter)
                } else {
                    state.commit_query()
                };
                match outcome {
                    ComboOutcome::Selected(value) | ComboOutcome::Created(value) => {
                        break ComboPromptResult::Value(value)
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    };

    guard.deactivate();
    stdout.execute(terminal::Clear(ClearType::FromCursorDown))?;
    println!();
    Ok(result)
}

fn render(stdout: &mut Stdout, label: &str, state: &ComboState) -> io::Result<()> {
    stdout.execute(cursor::MoveToColumn(0))?;
    stdout.execute(terminal::Clear(ClearType::FromCursorDown))?;
    write!(stdout, "{label}: {}", state.query())?;
    stdout.execute(cursor::SavePosition)?;
    if state.is_open() {
        let entries = state.entries();
        let visible = (MAX_MENU_HEIGHT / ROW_HEIGHT) as usize;
        for (index, entry) in entries.iter().enumerate().take(visible) {
            let pointer = if state.highlighted() == Some(index) { ">" } else { " " };
            let text = match entry {
                ComboEntry::Existing(option) => option.label.clone(),
                ComboEntry::Create(query) => format!("+ Add \"{query}\""),
            };
            write!(stdout, "\r\n {pointer} {text}")?;
        }
        if let Some(error) = state.error() {
            write!(stdout, "\r\n   {error}")?;
        }
    }
    stdout.execute(cursor::RestorePosition)?;
    stdout.flush()
}
