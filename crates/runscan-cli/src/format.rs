/// Output formatting: human-readable and JSON modes.
///
/// - **Human mode** (default): plain lines on stdout, with the validity and
///   screening tags color-coded. Colors are disabled when `--no-color` is
///   set, the `NO_COLOR` environment variable is present (per
///   <https://no-color.org>), or stdout is not a TTY.
/// - **JSON mode**: results are serialized with `serde_json`, one object per
///   line.
///
/// Summaries go to stderr and are suppressed by the **quiet** flag.
use std::io::{IsTerminal as _, Write};

use chrono::{DateTime, NaiveDate, Utc};
use runscan_core::{
    Candidate, ClientStatus, DailyStats, Extraction, Run, ScannedSubject, Screening, Visit,
};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted.
///
/// Colors are disabled when any of the following conditions hold:
/// - `no_color_flag` is `true` (the `--no-color` CLI flag was passed).
/// - The `NO_COLOR` environment variable is present (any value).
/// - stdout is not a TTY (e.g. the output is piped to a file).
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_RED: &str = "\x1b[31m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress all non-error stderr output.
    pub quiet: bool,
    /// Emit extra detail.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    ///
    /// `no_color_flag` is the `--no-color` boolean. Color detection also
    /// checks the `NO_COLOR` env var and the stdout TTY state.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colors {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_owned()
        }
    }
}

// ---------------------------------------------------------------------------
// Human-mode formatting
// ---------------------------------------------------------------------------

/// Writes the selected RUN, one line.  In verbose mode the selecting pass is
/// appended: `12.345.678-5  (labelled)`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_extraction_human<W: Write>(
    writer: &mut W,
    extraction: &Extraction,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.verbose {
        writeln!(writer, "{}  ({})", extraction.run, extraction.tier)
    } else {
        writeln!(writer, "{}", extraction.run)
    }
}

/// Writes one line per candidate.
///
/// Format: `  17  12.345.678-5  valid`, with the selected candidate marked
/// by a leading `*`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_candidates_human<W: Write>(
    writer: &mut W,
    candidates: &[Candidate],
    selected: Option<usize>,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    for candidate in candidates {
        let marker = if selected == Some(candidate.offset) {
            '*'
        } else {
            ' '
        };
        writeln!(
            writer,
            "{marker} {offset:>5}  {text}  {tag}",
            offset = candidate.offset,
            text = candidate.text,
            tag = validity_tag(candidate.valid, config),
        )?;
    }
    Ok(())
}

/// Writes one `validate` result line.
///
/// Format: `12.345.678-5  valid`
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_validity_human<W: Write>(
    writer: &mut W,
    input: &str,
    valid: bool,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    writeln!(writer, "{input}  {}", validity_tag(valid, config))
}

/// Writes a summary line for `validate`.
///
/// Format: `2 valid, 1 invalid`
///
/// Suppressed in quiet mode.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary_human<W: Write>(
    writer: &mut W,
    valid: usize,
    invalid: usize,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    writeln!(writer, "{valid} valid, {invalid} invalid")
}

/// Writes the result of `check-digit`.
///
/// Format: `check digit: 5`, followed by `run:         12.345.678-5` when
/// the body has a RUN's length.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_check_digit_human<W: Write>(
    writer: &mut W,
    check: char,
    run: Option<&Run>,
) -> std::io::Result<()> {
    writeln!(writer, "check digit: {check}")?;
    if let Some(run) = run {
        writeln!(writer, "run:         {run}")?;
    }
    Ok(())
}

/// Writes a screening result as aligned key/value lines.
///
/// The status is red for `banned`, green for `guest` and yellow for
/// `unidentified`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_screening_human<W: Write>(
    writer: &mut W,
    subject: &ScannedSubject,
    screening: &Screening,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    let status = screening.status.to_string();
    let status = match screening.status {
        ClientStatus::Banned => config.paint(ANSI_RED, &status),
        ClientStatus::Guest => config.paint(ANSI_GREEN, &status),
        ClientStatus::Unidentified => config.paint(ANSI_YELLOW, &status),
        ClientStatus::Regular => status,
    };
    writeln!(writer, "status:   {status}")?;

    match &subject.run {
        Some(run) => writeln!(writer, "run:      {run}")?,
        None => writeln!(writer, "run:      (none)")?,
    }
    if subject.has_full_name() {
        writeln!(
            writer,
            "name:     {} {}",
            subject.given_names, subject.surnames
        )?;
    }

    if let Some(client) = screening.client.as_ref().filter(|c| c.is_banned) {
        if let Some(level) = client.ban_level {
            writeln!(writer, "level:    {level}")?;
        }
        if let Some(reason) = &client.ban_reason {
            writeln!(writer, "reason:   {reason}")?;
        }
    }
    Ok(())
}

/// Writes the decision recorded after a screening.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_decision_human<W: Write>(
    writer: &mut W,
    decision: &DecisionReport,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    match decision {
        DecisionReport::Admitted { entry_time } => {
            let tag = config.paint(ANSI_GREEN, "admitted");
            writeln!(writer, "decision: {tag} at {}", entry_time.to_rfc3339())
        }
        DecisionReport::Banned { level, .. } => {
            let tag = config.paint(ANSI_RED, "banned");
            writeln!(writer, "decision: {tag} at level {level}")
        }
    }
}

/// Writes a client's visits, one RFC 3339 timestamp per line.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_visits_human<W: Write>(writer: &mut W, visits: &[Visit]) -> std::io::Result<()> {
    for visit in visits {
        writeln!(writer, "{}", visit.entry_time.to_rfc3339())?;
    }
    Ok(())
}

/// Writes a day's door statistics as aligned key/value lines.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_stats_human<W: Write>(
    writer: &mut W,
    date: NaiveDate,
    stats: &DailyStats,
) -> std::io::Result<()> {
    writeln!(writer, "date:           {date}")?;
    writeln!(writer, "visits:         {}", stats.total_visits)?;
    writeln!(writer, "  male:         {}", stats.male_visits)?;
    writeln!(writer, "  female:       {}", stats.female_visits)?;
    writeln!(writer, "new clients:    {}", stats.new_clients)?;
    writeln!(writer, "  male:         {}", stats.male_clients)?;
    writeln!(writer, "  female:       {}", stats.female_clients)?;
    writeln!(writer, "incidents:      {}", stats.incidents)
}

// ---------------------------------------------------------------------------
// JSON-mode formatting
// ---------------------------------------------------------------------------

/// Writes `value` as a single line of JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing to `writer` fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, value).map_err(std::io::Error::from)?;
    writeln!(writer)
}

/// One `validate` result in JSON mode.
#[derive(Debug, Serialize)]
pub struct Validity<'a> {
    /// The argument as given.
    pub input: &'a str,
    /// Whether its check digit is correct.
    pub valid: bool,
}

/// A `check-digit` result in JSON mode.
#[derive(Debug, Serialize)]
pub struct CheckDigitReport<'a> {
    /// The body as given.
    pub body: &'a str,
    /// The computed check character.
    pub check_digit: char,
    /// The complete RUN, when the body has a RUN's length.
    pub run: Option<&'a Run>,
}

/// A screening result in JSON mode.
#[derive(Debug, Serialize)]
pub struct ScreenReport<'a> {
    /// The normalized subject.
    pub subject: &'a ScannedSubject,
    /// The outcome.
    #[serde(flatten)]
    pub screening: &'a Screening,
    /// The decision recorded afterwards, if one was requested and taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<&'a DecisionReport>,
}

/// A door decision taken by `screen --admit` or `screen --ban`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionReport {
    /// A visit was recorded.
    Admitted {
        /// When.
        entry_time: DateTime<Utc>,
    },
    /// A ban was recorded.
    Banned {
        /// Ban level.
        level: u8,
        /// Ban reason.
        reason: String,
    },
}

/// A `visits` result in JSON mode.
#[derive(Debug, Serialize)]
pub struct VisitsReport<'a> {
    /// The client asked about.
    pub run: &'a Run,
    /// Their visits, most recent first.
    pub visits: &'a [Visit],
}

/// A `stats` result in JSON mode.
#[derive(Debug, Serialize)]
pub struct StatsReport<'a> {
    /// The UTC day summarized.
    pub date: NaiveDate,
    /// The counts.
    #[serde(flatten)]
    pub stats: &'a DailyStats,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validity_tag(valid: bool, config: &FormatterConfig) -> String {
    if valid {
        config.paint(ANSI_GREEN, "valid")
    } else {
        config.paint(ANSI_RED, "invalid")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
