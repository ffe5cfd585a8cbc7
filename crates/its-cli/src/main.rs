//! # ITS CLI
//!
//! Command-line administration for the identity-resolution subsystem.

#![forbid(unsafe_code)]

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use its_cli::cli::{Cli, Command};
use its_cli::commands::{run_config, run_login, run_reconcile, run_roster, run_search};
use its_cli::output::error;
use its_cli::state::RosterFile;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let roster_file = RosterFile::new(&cli.roster_file);

    let result = match cli.command {
        Command::Roster(cmd) => run_roster(cmd, &roster_file, cli.output).await,
        Command::Login {
            id,
            secret,
            timeout_secs,
        } => run_login(&id, &secret, timeout_secs, &roster_file, cli.output).await,
        Command::Reconcile { ids, file } => {
            run_reconcile(ids, file.as_deref(), &roster_file, cli.output).await
        }
        Command::Search { query } => run_search(&query, &roster_file, cli.output).await,
        Command::Config(cmd) => run_config(cmd, cli.output).await,
    };

    if let Err(err) = result {
        error(&err.to_string());
        std::process::exit(1);
    }
}
