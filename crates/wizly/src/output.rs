//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Green for healthy, red for unavailable, plain otherwise.
pub fn paint_state(state: &str, color: bool) -> String {
    if !color {
        return state.to_owned();
    }
    match state {
        "unavailable" => state.red().to_string(),
        "online" => state.green().to_string(),
        _ => state.cyan().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable items in the chosen format.
///
/// `to_row` builds the table row, `id_fn` the single `plain` line.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single item. Table mode uses `detail_fn`'s pre-formatted text.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Field helpers for loosely-typed records ──────────────────────────

/// Display a JSON field for a table cell. Strings are unquoted, arrays are
/// joined with ", ", null and missing fields are empty.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// First non-empty field among `keys`.
pub fn first_cell(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| cell(record.get(key)))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::InvalidResponse {
        message: format!("cannot render YAML: {e}"),
    })
}
