//! Implementation of `runscan stats --registry FILE [--date DAY]`.
//!
//! Summarizes one UTC day of door activity: visits, new clients and
//! incidents.  Without `--date` the current UTC day is used.
//!
//! Exit codes: 0 = success, 2 = unreadable registry.
use chrono::NaiveDate;
use runscan_core::{DecisionLog, MemoryRegistry};

use crate::OutputFormat;
use crate::cmd::stdout_error;
use crate::error::CliError;
use crate::format::{StatsReport, write_json, write_stats_human};

/// Runs the `stats` command for `date`.
///
/// # Errors
///
/// Returns [`CliError::IoError`] if stdout cannot be written.
pub fn run(
    date: NaiveDate,
    registry: &MemoryRegistry,
    format: OutputFormat,
) -> Result<(), CliError> {
    let stats = registry.daily_stats(date);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => write_stats_human(&mut out, date, &stats),
        OutputFormat::Json => write_json(
            &mut out,
            &StatsReport {
                date,
                stats: &stats,
            },
        ),
    }
    .map_err(|e| stdout_error(&e))
}
