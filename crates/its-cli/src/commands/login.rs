//! Single-login command.

use std::time::Duration;

use crate::commands::AppContext;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::state::RosterFile;

/// Runs one login attempt and prints the session-ready result.
///
/// ## Errors
///
/// Surfaces the gateway's failure as-is: validation and credential
/// problems are client errors; timeouts are transient.
pub async fn run_login(
    id: &str,
    secret: &str,
    timeout_secs: Option<u64>,
    roster_file: &RosterFile,
    format: OutputFormat,
) -> CliResult<()> {
    let ctx = AppContext::build(roster_file.load()?)?;

    let result = match timeout_secs {
        Some(secs) => {
            ctx.gateway
                .login_with_deadline(id, secret, Duration::from_secs(secs))
                .await?
        }
        None => ctx.gateway.login(id, secret).await?,
    };

    match format {
        OutputFormat::Json => output::output_single(&result)?,
        OutputFormat::Table => {
            output::success(&format!(
                "{} authenticated as {}",
                result.profile.its_id, result.role
            ));
            output::info(&format!("name: {}", result.profile.full_name()));
            output::info(&format!("email: {}", result.profile.email));
            output::info(&format!(
                "synced at: {}",
                result.profile.last_synced_at.to_rfc3339()
            ));
        }
    }
    Ok(())
}
