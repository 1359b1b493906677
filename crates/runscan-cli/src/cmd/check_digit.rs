//! Implementation of `runscan check-digit BODY`.
//!
//! Prints the check character for a body, and the complete dotted RUN when
//! the body has seven or eight digits.
//!
//! Exit codes: 0 = success, 2 = the body is not all digits.
use runscan_core::{Run, expected_check_char};

use crate::OutputFormat;
use crate::cmd::stdout_error;
use crate::error::CliError;
use crate::format::{CheckDigitReport, write_check_digit_human, write_json};

/// Runs the `check-digit` command.
///
/// # Errors
///
/// Returns [`CliError::InvalidBody`] (exit code 2) if `body` is empty or
/// contains a non-digit, or [`CliError::IoError`] if stdout cannot be
/// written.
pub fn run(body: &str, format: OutputFormat) -> Result<(), CliError> {
    let check = expected_check_char(body).ok_or_else(|| CliError::InvalidBody {
        body: body.to_owned(),
    })?;
    let run = Run::try_from(format!("{body}-{check}").as_str()).ok();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => write_check_digit_human(&mut out, check, run.as_ref()),
        OutputFormat::Json => write_json(
            &mut out,
            &CheckDigitReport {
                body,
                check_digit: check,
                run: run.as_ref(),
            },
        ),
    }
    .map_err(|e| stdout_error(&e))
}
