//! Bulk reconciliation command.

use std::path::Path;

use serde::Serialize;
use tabled::Tabled;

use its_auth::{ReconcileSummary, SyncOutcome};

use crate::commands::AppContext;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::state::RosterFile;

/// One outcome row.
#[derive(Debug, Tabled, Serialize)]
struct OutcomeRow {
    /// Submitted ID.
    its_id: String,
    /// Outcome tag.
    status: String,
    /// Resolved role, when synchronized.
    role: String,
    /// Failure detail, when any.
    detail: String,
}

impl From<&SyncOutcome> for OutcomeRow {
    fn from(outcome: &SyncOutcome) -> Self {
        let (role, detail) = match outcome {
            SyncOutcome::Success { profile, .. } => (profile.role.to_string(), String::new()),
            SyncOutcome::NotFound { .. } => (String::new(), "no record in source".to_string()),
            SyncOutcome::ValidationError { reason, .. } | SyncOutcome::Timeout { reason, .. } => {
                (String::new(), reason.clone())
            }
        };
        Self {
            its_id: outcome.raw_id().to_string(),
            status: outcome.label().to_string(),
            role,
            detail,
        }
    }
}

/// Reconciles the given IDs plus any from `--file`, printing one row per
/// input and a summary fold.
///
/// ## Errors
///
/// Per-ID failures are rows, never errors; only an unreadable ID file or
/// a source configuration problem fails the command.
pub async fn run_reconcile(
    mut ids: Vec<String>,
    file: Option<&Path>,
    roster_file: &RosterFile,
    format: OutputFormat,
) -> CliResult<()> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)?;
        ids.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }
    if ids.is_empty() {
        return Err(CliError::Validation(
            "no ids given; pass them as arguments or via --file".to_string(),
        ));
    }

    let ctx = AppContext::build(roster_file.load()?)?;
    let outcomes = ctx.bulk.reconcile_many(&ids).await?;
    let summary = ReconcileSummary::from_outcomes(&outcomes);

    match format {
        OutputFormat::Json => output::output_single(&outcomes)?,
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = outcomes.iter().map(OutcomeRow::from).collect();
            output::output(&rows, format)?;
        }
    }

    output::info(&format!(
        "attempted {}, succeeded {}, not found {}, invalid {}, timed out {}",
        summary.attempted, summary.succeeded, summary.not_found, summary.invalid, summary.timed_out
    ));
    Ok(())
}
