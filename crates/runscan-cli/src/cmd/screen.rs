//! Implementation of `runscan screen --registry FILE [CAPTURE]`.
//!
//! Reads a captured-document JSON (the fields the card scanner reported),
//! normalizes it, and screens the subject against a JSON client registry.
//! The status is printed whatever it is; a banned subject is still a
//! successful run.  With `--admit` or `--ban` the decision is recorded and
//! the registry file rewritten.
//!
//! Exit codes: 0 = screened (and decision recorded), 1 = decision refused,
//! 2 = unreadable capture or registry.
use std::path::Path;

use chrono::{DateTime, Utc};
use runscan_core::{
    BanDecision, CapturedId, DecisionError, Extractor, MemoryRegistry, ScannedSubject, admit,
    ban_subject, screen,
};

use crate::OutputFormat;
use crate::cli::DecisionArgs;
use crate::cmd::{save_registry, stdout_error};
use crate::error::CliError;
use crate::format::{
    DecisionReport, FormatterConfig, ScreenReport, write_decision_human, write_json,
    write_screening_human,
};

/// Parses the capture JSON in `content`.
fn parse_capture(content: &str, source: &str) -> Result<CapturedId, CliError> {
    serde_json::from_str(content).map_err(|e| CliError::CaptureInvalid {
        source: source.to_owned(),
        detail: format!("line {}, column {}: {e}", e.line(), e.column()),
    })
}

/// Applies the requested decision, if any, to `registry`.
fn decide(
    registry: &mut MemoryRegistry,
    subject: &ScannedSubject,
    args: &DecisionArgs,
    at: DateTime<Utc>,
) -> Option<Result<DecisionReport, DecisionError>> {
    if args.admit {
        return Some(
            admit(registry, subject, at).map(|v| DecisionReport::Admitted {
                entry_time: v.entry_time,
            }),
        );
    }
    let level = args.ban?;
    let decision = BanDecision {
        level,
        reason: args.reason.clone().unwrap_or_default(),
        description: args.description.clone().unwrap_or_default(),
    };
    Some(
        ban_subject(registry, subject, &decision, at).map(|_| DecisionReport::Banned {
            level,
            reason: decision.reason,
        }),
    )
}

/// Runs the `screen` command over the capture JSON in `content`.
///
/// Screening uses the registry as loaded; a decision is applied afterwards
/// and saved to `registry_path` only when it succeeds.
///
/// # Errors
///
/// - [`CliError::CaptureInvalid`] (exit code 2) if `content` is not a
///   captured-document object.
/// - [`CliError::DecisionRefused`] (exit code 1) if the decision cannot be
///   recorded; the screening is still printed.
/// - [`CliError::IoError`] if stdout or the registry file cannot be
///   written.
#[allow(clippy::too_many_arguments)]
pub fn run(
    content: &str,
    source: &str,
    registry: &mut MemoryRegistry,
    registry_path: &Path,
    extractor: &Extractor,
    args: &DecisionArgs,
    at: DateTime<Utc>,
    format: OutputFormat,
    config: &FormatterConfig,
) -> Result<(), CliError> {
    let captured = parse_capture(content, source)?;
    let subject = ScannedSubject::from_capture_with(&captured, extractor);
    let screening = screen(&*registry, &subject);

    let (decision, refusal) = match decide(registry, &subject, args, at) {
        None => (None, None),
        Some(Ok(report)) => (Some(report), None),
        Some(Err(e)) => (None, Some(e)),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => {
            write_screening_human(&mut out, &subject, &screening, config).and_then(|()| {
                match &decision {
                    Some(d) => write_decision_human(&mut out, d, config),
                    None => Ok(()),
                }
            })
        }
        OutputFormat::Json => write_json(
            &mut out,
            &ScreenReport {
                subject: &subject,
                screening: &screening,
                decision: decision.as_ref(),
            },
        ),
    }
    .map_err(|e| stdout_error(&e))?;

    if let Some(e) = refusal {
        return Err(CliError::DecisionRefused {
            detail: e.to_string(),
        });
    }
    if decision.is_some() {
        save_registry(registry_path, registry)?;
    }
    Ok(())
}
