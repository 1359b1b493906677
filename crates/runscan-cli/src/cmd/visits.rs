//! Implementation of `runscan visits --registry FILE RUN`.
//!
//! Lists the visits recorded for one client, most recent first.  A RUN with
//! no visits prints nothing.
//!
//! Exit codes: 0 = success, 2 = unreadable registry.
use runscan_core::{DecisionLog, MemoryRegistry, Run};

use crate::OutputFormat;
use crate::cmd::stdout_error;
use crate::error::CliError;
use crate::format::{VisitsReport, write_json, write_visits_human};

/// Runs the `visits` command.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if stdout cannot be written.
pub fn run(run: &Run, registry: &MemoryRegistry, format: OutputFormat) -> Result<(), CliError> {
    let visits = registry.client_visits(run);
    tracing::debug!(run = %run, count = visits.len(), "client visits");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => write_visits_human(&mut out, &visits),
        OutputFormat::Json => write_json(
            &mut out,
            &VisitsReport {
                run,
                visits: &visits,
            },
        ),
    }
    .map_err(|e| stdout_error(&e))
}
