//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use runscan_core::Run;

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].  This avoids stringly-typed handling of the stdin
/// sentinel throughout the codebase.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits plain, optionally colored lines to stdout.  `Json` emits
/// structured JSON (NDJSON for per-argument results, single object for
/// data).
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// Structured JSON / NDJSON output.
    Json,
}

/// Extraction tuning shared by every subcommand that reads OCR text.
#[derive(Args, Clone, Debug, Default)]
pub struct ExtractArgs {
    /// JSON file with extraction settings (`context_radius`,
    /// `document_label`, `run_label`).
    ///
    /// Can also be set via the `RUNSCAN_CONFIG` environment variable.
    #[arg(long, value_name = "FILE", env = "RUNSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Characters of context inspected on each side of a candidate.
    ///
    /// Overrides the value from `--config`.
    #[arg(long, value_name = "N")]
    pub context_radius: Option<usize>,
}

/// A door decision to record after `screen`.
#[derive(Args, Clone, Debug, Default)]
pub struct DecisionArgs {
    /// Let the subject in and record the visit.  Refused for banned clients.
    #[arg(long, conflicts_with = "ban")]
    pub admit: bool,

    /// Ban the subject at this level.
    #[arg(long, value_name = "LEVEL", requires = "reason")]
    pub ban: Option<u8>,

    /// Reason recorded with `--ban`.
    #[arg(long, value_name = "TEXT", requires = "ban")]
    pub reason: Option<String>,

    /// Account of the incident recorded with `--ban`.
    #[arg(long, value_name = "TEXT", requires = "ban")]
    pub description: Option<String>,
}

/// All top-level subcommands exposed by the `runscan` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Find the holder's RUN in OCR text from an identity card.
    Extract {
        /// Path to a text file, or `-` for stdin (default).
        #[arg(value_name = "FILE", default_value = "-")]
        file: PathOrStdin,
        /// Also list every RUN-shaped candidate and whether it validates.
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Check the check digit of one or more RUNs.
    Validate {
        /// RUNs to check, e.g. `12.345.678-5` or `16543210-K`.
        #[arg(value_name = "RUN", num_args = 1.., required = true)]
        runs: Vec<String>,
    },

    /// Compute the check character for a RUN body.
    #[command(name = "check-digit")]
    CheckDigit {
        /// Body digits without dots, e.g. `12345678`.
        #[arg(value_name = "BODY")]
        body: String,
    },

    /// Screen a captured identity document against a client registry.
    Screen {
        /// Path to a captured-document JSON file, or `-` for stdin (default).
        #[arg(value_name = "CAPTURE", default_value = "-")]
        capture: PathOrStdin,
        /// JSON registry with `clients` and `guests`.  Rewritten in place
        /// when a decision is recorded.
        #[arg(long, value_name = "FILE")]
        registry: PathBuf,
        #[command(flatten)]
        extract: ExtractArgs,
        #[command(flatten)]
        decision: DecisionArgs,
    },

    /// Lift a client's ban.
    Unban {
        /// The client's RUN.
        #[arg(value_name = "RUN")]
        run: Run,
        /// JSON registry, rewritten in place.
        #[arg(long, value_name = "FILE")]
        registry: PathBuf,
    },

    /// List a client's visits, most recent first.
    Visits {
        /// The client's RUN.
        #[arg(value_name = "RUN")]
        run: Run,
        /// JSON registry.
        #[arg(long, value_name = "FILE")]
        registry: PathBuf,
    },

    /// Summarize one day of door activity.
    Stats {
        /// JSON registry.
        #[arg(long, value_name = "FILE")]
        registry: PathBuf,
        /// UTC day as `YYYY-MM-DD`; today when omitted.
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },
}

/// Root CLI struct for the `runscan` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "runscan",
    version,
    about = "Chilean RUN/RUT validation and extraction",
    long_about = "Validates Chilean RUN/RUT check digits, extracts the holder's RUN\n\
                  from noisy identity-card OCR text, and screens scanned\n\
                  documents against a client registry."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Only log errors to stderr (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log extraction decisions to stderr (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `RUNSCAN_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 16777216 (16 MiB).
    #[arg(
        long,
        global = true,
        env = "RUNSCAN_MAX_FILE_SIZE",
        default_value = "16777216"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}
