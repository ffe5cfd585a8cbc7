//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use its_roster::UploadFormat;

use crate::output::OutputFormat;

/// ITS CLI - administration tool for identity resolution.
#[derive(Debug, Parser)]
#[command(name = "its")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Roster state file holding the membership override lists.
    #[arg(long, env = "ITS_ROSTER_FILE", default_value = "its-roster.json")]
    pub roster_file: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Membership override list management.
    #[command(subcommand)]
    Roster(RosterCommand),

    /// Authenticate one ID and print the session-ready result.
    Login {
        /// 8-digit registry ID.
        id: String,

        /// Secret to validate.
        #[arg(long)]
        secret: String,

        /// Abort the attempt after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Reconcile many IDs, one outcome row per input.
    Reconcile {
        /// IDs to reconcile.
        ids: Vec<String>,

        /// File with one ID per line, appended to the positional IDs.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Search the registry.
    Search {
        /// Free-text query.
        query: String,
    },

    /// Source configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Roster commands.
#[derive(Debug, Subcommand)]
pub enum RosterCommand {
    /// Import IDs into a list from a file.
    Import {
        /// List name (e.g. "learners", "regional-coordinators").
        list: String,

        /// Upload file: plain text, JSON or CSV.
        #[arg(long)]
        file: PathBuf,

        /// Upload format (guessed from the file extension if omitted).
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Replace the whole list instead of appending.
        #[arg(long)]
        replace: bool,
    },

    /// Print a list's members.
    Show {
        /// List name.
        list: String,
    },

    /// Empty a list.
    Clear {
        /// List name.
        list: String,
    },
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective source configuration.
    Show,

    /// Probe the configured identity source.
    Check,
}

/// Upload format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// One ID per line.
    Plain,
    /// `{"ids": [...]}`.
    Json,
    /// CSV with an `its_id` header.
    Csv,
}

impl From<FormatArg> for UploadFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plain => Self::Plain,
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
        }
    }
}
