use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::cli::ui::test_mode;
use crate::cli::CliError;

/// Asks a yes/no question. Scripted runs take `default` without prompting.
pub fn confirm_action(prompt: &str, default: bool) -> Result<bool, CliError> {
    if test_mode::is_enabled() {
        return Ok(default);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CliError::from)
}
