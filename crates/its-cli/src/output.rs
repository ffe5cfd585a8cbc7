//! Output formatting utilities.

use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::CliResult;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Outputs rows in the selected format.
///
/// ## Errors
///
/// Fails only when JSON serialization fails.
pub fn output<T: Tabled + serde::Serialize>(data: &[T], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                info("No results.");
            } else {
                let table = Table::new(data).with(Style::rounded()).to_string();
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Outputs a single item as pretty JSON.
///
/// ## Errors
///
/// Fails only when JSON serialization fails.
pub fn output_single<T: serde::Serialize>(item: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(item)?;
    println!("{json}");
    Ok(())
}
