//! Implementation of `runscan validate RUN...`.
//!
//! Checks the check digit of each argument and prints one line per argument:
//! `RUN  valid` or `RUN  invalid` in human mode, an NDJSON object in JSON
//! mode.  A summary line goes to stderr unless `--quiet` is set.
//!
//! Exit codes: 0 = all valid, 1 = at least one invalid.
use runscan_core::is_valid_national_id;

use crate::OutputFormat;
use crate::cmd::stdout_error;
use crate::error::CliError;
use crate::format::{
    FormatterConfig, Validity, write_json, write_summary_human, write_validity_human,
};

/// Runs the `validate` command.
///
/// # Errors
///
/// Returns [`CliError::InvalidRuns`] (exit code 1) if any argument fails its
/// check digit, or [`CliError::IoError`] if stdout cannot be written.
pub fn run(
    runs: &[String],
    format: OutputFormat,
    config: &FormatterConfig,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut invalid = 0usize;
    for input in runs {
        let valid = is_valid_national_id(input);
        if !valid {
            invalid += 1;
        }
        match format {
            OutputFormat::Human => write_validity_human(&mut out, input, valid, config),
            OutputFormat::Json => write_json(&mut out, &Validity { input, valid }),
        }
        .map_err(|e| stdout_error(&e))?;
    }

    if matches!(format, OutputFormat::Human) {
        let stderr = std::io::stderr();
        let mut err = stderr.lock();
        write_summary_human(&mut err, runs.len() - invalid, invalid, config)
            .map_err(|e| CliError::IoError {
                source: "stderr".to_owned(),
                detail: e.to_string(),
            })?;
    }

    if invalid > 0 {
        return Err(CliError::InvalidRuns {
            invalid,
            total: runs.len(),
        });
    }
    Ok(())
}
