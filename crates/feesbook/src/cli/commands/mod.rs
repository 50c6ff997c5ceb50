pub mod catalog;
pub mod payment;
pub mod register;
pub mod report;
pub mod students;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::errors::{AppError, Result};

/// Free-text prompt; empty input is allowed and returned as-is.
pub(crate) fn text_input(prompt: &str) -> Result<String> {
    let value = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(true)
        .interact()?;
    Ok(answer)
}

/// Single-choice prompt; returns the index of the selected option.
pub(crate) fn select(prompt: &str, options: &[String]) -> Result<usize> {
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(options)
        .default(0)
        .interact()?;
    Ok(index)
}

/// Parses a positional student id argument.
pub(crate) fn parse_student_id(args: &[String]) -> Result<i64> {
    let raw = args
        .first()
        .ok_or_else(|| AppError::Input("a student id is required".into()))?;
    raw.parse::<i64>()
        .map_err(|_| AppError::Input(format!("`{raw}` is not a valid student id")))
}
