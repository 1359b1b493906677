//! Implementation of `runscan unban --registry FILE RUN`.
//!
//! Lifts a client's ban and rewrites the registry file.
//!
//! Exit codes: 0 = ban lifted, 1 = no such client, 2 = unreadable registry.
use std::io::Write as _;
use std::path::Path;

use runscan_core::{DecisionLog, MemoryRegistry, Run};

use crate::OutputFormat;
use crate::cmd::{save_registry, stdout_error};
use crate::error::CliError;
use crate::format::write_json;

/// Runs the `unban` command.
///
/// # Errors
///
/// Returns [`CliError::DecisionRefused`] (exit code 1) if `run` is not a
/// registered client, or [`CliError::IoError`] if the registry or stdout
/// cannot be written.
pub fn run(
    run: &Run,
    registry: &mut MemoryRegistry,
    registry_path: &Path,
    format: OutputFormat,
) -> Result<(), CliError> {
    let record = registry.unban(run).map_err(|e| CliError::DecisionRefused {
        detail: e.to_string(),
    })?;
    save_registry(registry_path, registry)?;
    tracing::info!(run = %run, "ban lifted");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => writeln!(out, "unbanned: {run}"),
        OutputFormat::Json => write_json(&mut out, &record),
    }
    .map_err(|e| stdout_error(&e))
}
