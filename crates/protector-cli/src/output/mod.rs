//! Output formatting and display utilities.

mod error;
mod format;
mod table;

pub use error::{print_error, CliError, ErrorKind};
pub use format::OutputFormat;
pub use table::TableDisplay;

use colored::Colorize;
use serde::Serialize;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a warning message.
pub fn warn(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Serializes `data` for the machine-readable formats.
///
/// Returns `None` for the human-readable formats.
pub fn render_structured<T: Serialize + ?Sized>(
    data: &T,
    format: OutputFormat,
) -> Result<Option<String>, CliError> {
    if !format.is_structured() {
        return Ok(None);
    }
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(data)
            .map_err(|e| CliError::output(format!("Failed to serialize YAML: {e}")))?,
        OutputFormat::JsonCompact => serde_json::to_string(data)
            .map_err(|e| CliError::output(format!("Failed to serialize JSON: {e}")))?,
        _ => serde_json::to_string_pretty(data)
            .map_err(|e| CliError::output(format!("Failed to serialize JSON: {e}")))?,
    };
    Ok(Some(rendered))
}

/// Prints formatted output based on the selected format.
pub fn print_output<T: TableDisplay>(data: &T, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => data.print_table(),
        OutputFormat::Plain => data.print_plain(),
        _ => {
            if let Some(rendered) = render_structured(data, format)? {
                println!("{}", rendered.trim_end());
            }
        }
    }
    Ok(())
}

/// Prints a list of items.
pub fn print_list<T: TableDisplay>(items: &[T], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => {
            T::print_table_header();
            for item in items {
                item.print_table_row();
            }
        }
        OutputFormat::Plain => {
            for item in items {
                item.print_plain();
            }
        }
        _ => {
            if let Some(rendered) = render_structured(items, format)? {
                println!("{}", rendered.trim_end());
            }
        }
    }
    Ok(())
}

/// Truncates a string to a maximum number of characters with ellipsis.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
