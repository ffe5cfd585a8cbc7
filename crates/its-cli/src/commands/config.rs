//! Source configuration commands.

use serde::Serialize;

use its_roster::MembershipListStore;
use its_source::{SourceConfig, SourceMode};

use crate::cli::ConfigCommand;
use crate::commands::AppContext;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};

/// Redacted view of the effective configuration.
#[derive(Debug, Serialize)]
struct ConfigView {
    mode: SourceMode,
    fetch_base_url: Option<String>,
    credential_base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: u64,
    retry_attempts: u32,
    cache_ttl_secs: u64,
    min_secret_len: usize,
    max_in_flight: usize,
}

impl From<&SourceConfig> for ConfigView {
    fn from(config: &SourceConfig) -> Self {
        Self {
            mode: config.mode,
            fetch_base_url: config.fetch_base_url.clone(),
            credential_base_url: config.credential_base_url.clone(),
            api_key: config.api_key.as_ref().map(|_| "<redacted>".to_string()),
            timeout_secs: config.request_timeout.as_secs(),
            retry_attempts: config.retry_attempts,
            cache_ttl_secs: config.cache_ttl.as_secs(),
            min_secret_len: config.min_secret_len,
            max_in_flight: config.max_in_flight,
        }
    }
}

/// Runs a config subcommand.
///
/// ## Errors
///
/// `show` fails only on misconfiguration; `check` also fails when the
/// source probe does.
pub async fn run_config(command: ConfigCommand, _format: OutputFormat) -> CliResult<()> {
    match command {
        ConfigCommand::Show => {
            let config = SourceConfig::from_env()?;
            output::output_single(&ConfigView::from(&config))
        }
        ConfigCommand::Check => {
            let ctx = AppContext::build(MembershipListStore::new())?;
            ctx.source.probe().await?;
            output::success(&format!("{} source reachable", ctx.source.kind()));
            Ok(())
        }
    }
}
