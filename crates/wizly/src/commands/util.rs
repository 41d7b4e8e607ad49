//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a `--data` argument as a JSON value.
pub fn parse_json_arg(field: &str, raw: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Print a status line to stderr unless `--quiet`.
pub fn note(quiet: bool, message: &str) {
    if !quiet {
        eprintln!("{message}");
    }
}
