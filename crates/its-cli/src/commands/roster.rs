//! Roster list management commands.

use serde::Serialize;
use tabled::Tabled;

use its_roster::{parse, UploadFormat};

use crate::cli::RosterCommand;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::state::RosterFile;

/// One roster member row.
#[derive(Debug, Tabled, Serialize)]
struct MemberRow {
    /// Registry ID.
    its_id: String,
}

/// Runs a roster subcommand.
///
/// ## Errors
///
/// Fails on unreadable files and malformed upload containers;
/// individually invalid IDs are reported and skipped (partial success).
pub async fn run_roster(
    command: RosterCommand,
    roster_file: &RosterFile,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        RosterCommand::Import {
            list,
            file,
            format: upload_format,
            replace,
        } => {
            let input = std::fs::read_to_string(&file)?;
            let upload_format = upload_format.map_or_else(
                || UploadFormat::detect(&file.to_string_lossy()),
                Into::into,
            );

            let report = parse(&input, upload_format)?;
            for rejected in &report.rejected {
                output::warning(&format!(
                    "entry {}: {:?} skipped ({})",
                    rejected.position, rejected.value, rejected.reason
                ));
            }

            let store = roster_file.load()?;
            let size = if replace {
                store.replace_all(&list, report.accepted.iter().cloned())
            } else {
                store.add(&list, report.accepted.iter().cloned());
                store.len(&list)
            };
            roster_file.save(&store)?;

            output::success(&format!(
                "{list}: {} accepted, {} rejected; list now has {size} ids",
                report.accepted.len(),
                report.rejected.len(),
            ));
            Ok(())
        }

        RosterCommand::Show { list } => {
            let store = roster_file.load()?;
            let rows: Vec<MemberRow> = store
                .members(&list)
                .into_iter()
                .map(|id| MemberRow {
                    its_id: id.to_string(),
                })
                .collect();
            output::output(&rows, format)
        }

        RosterCommand::Clear { list } => {
            let store = roster_file.load()?;
            store.clear(&list);
            roster_file.save(&store)?;
            output::success(&format!("{list}: cleared"));
            Ok(())
        }
    }
}
