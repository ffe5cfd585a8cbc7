//! Registry search command.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use crate::commands::AppContext;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::state::RosterFile;

/// One search result row.
#[derive(Debug, Tabled, Serialize)]
struct SearchRow {
    /// Registry ID.
    its_id: String,
    /// Full name.
    name: String,
    /// Occupation.
    occupation: String,
    /// Membership category.
    category: String,
}

/// Searches the registry through the response cache.
///
/// ## Errors
///
/// Surfaces source failures as-is.
pub async fn run_search(query: &str, roster_file: &RosterFile, format: OutputFormat) -> CliResult<()> {
    let ctx = AppContext::build(roster_file.load()?)?;

    let source = Arc::clone(&ctx.source);
    let owned_query = query.to_string();
    let records = ctx
        .cache
        .search_or_fetch(query, move || async move { source.search(&owned_query).await })
        .await?;

    let rows: Vec<SearchRow> = records
        .iter()
        .map(|record| SearchRow {
            its_id: record.id.to_string(),
            name: record.full_name(),
            occupation: record.occupation.clone(),
            category: record.category.clone(),
        })
        .collect();
    output::output(&rows, format)
}
