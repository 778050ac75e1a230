use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use super::{output, CliError};

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm(theme: &ColorfulTheme, prompt: &str, default: bool) -> Result<bool, CliError> {
    Ok(Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Prompt the user for free-form text input (empty allowed).
pub fn text(theme: &ColorfulTheme, prompt: &str) -> Result<String, CliError> {
    Ok(Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

pub fn amount(theme: &ColorfulTheme, prompt: &str) -> Result<f64, CliError> {
    Ok(Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .interact_text()?)
}

pub fn integer(theme: &ColorfulTheme, prompt: &str) -> Result<u32, CliError> {
    Ok(Input::<u32>::with_theme(theme)
        .with_prompt(prompt)
        .interact_text()?)
}

/// Prompt for a `YYYY-MM-DD` date, defaulting when left empty.
pub fn date(theme: &ColorfulTheme, prompt: &str, default: NaiveDate) -> Result<NaiveDate, CliError> {
    loop {
        let raw: String = Input::<String>::with_theme(theme)
            .with_prompt(format!("{prompt} (YYYY-MM-DD, empty = {default})"))
            .allow_empty(true)
            .interact_text()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(default);
        }
        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(parsed) => return Ok(parsed),
            Err(_) => output::warning("Could not parse the date, expected YYYY-MM-DD."),
        }
    }
}

pub fn select(theme: &ColorfulTheme, prompt: &str, items: &[&str]) -> Result<usize, CliError> {
    Ok(Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?)
}
