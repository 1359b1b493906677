//! Implementation of `runscan extract [FILE]`.
//!
//! Reads OCR text from a file or stdin and prints the holder's RUN.  With
//! `--all` every RUN-shaped candidate is listed as well, which is the quickest
//! way to see why a scan picked the number it did.
//!
//! Exit codes: 0 = RUN found, 1 = no valid RUN, 2 = input failure.
use std::time::Instant;

use runscan_core::Extractor;

use crate::OutputFormat;
use crate::cmd::stdout_error;
use crate::error::CliError;
use crate::format::{FormatterConfig, write_candidates_human, write_extraction_human, write_json};

/// Runs the `extract` command over `content`.
///
/// # Errors
///
/// Returns [`CliError::NoRunFound`] (exit code 1) when the text holds no
/// checksum-valid RUN, or [`CliError::IoError`] if stdout cannot be written.
pub fn run(
    content: &str,
    extractor: &Extractor,
    all: bool,
    format: OutputFormat,
    config: &FormatterConfig,
) -> Result<(), CliError> {
    let started = Instant::now();
    let found = extractor.extract(content);
    tracing::debug!(
        elapsed_us = started.elapsed().as_micros(),
        bytes = content.len(),
        found = found.is_some(),
        "extraction finished"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match (found, format) {
        (Some(extraction), OutputFormat::Human) => {
            write_extraction_human(&mut out, &extraction, config).map_err(|e| stdout_error(&e))?;
            if all {
                write_candidates_human(
                    &mut out,
                    &extraction.candidates,
                    Some(extraction.offset),
                    config,
                )
                .map_err(|e| stdout_error(&e))?;
            }
            Ok(())
        }
        (Some(extraction), OutputFormat::Json) => {
            write_json(&mut out, &extraction).map_err(|e| stdout_error(&e))
        }
        (None, OutputFormat::Human) => {
            if all {
                let candidates = extractor.candidates(content);
                write_candidates_human(&mut out, &candidates, None, config)
                    .map_err(|e| stdout_error(&e))?;
            }
            Err(CliError::NoRunFound)
        }
        (None, OutputFormat::Json) => {
            if all {
                let candidates = extractor.candidates(content);
                let report = serde_json::json!({
                    "run": null,
                    "offset": null,
                    "tier": null,
                    "candidates": candidates,
                });
                write_json(&mut out, &report).map_err(|e| stdout_error(&e))?;
            }
            Err(CliError::NoRunFound)
        }
    }
}
