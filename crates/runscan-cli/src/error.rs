/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `runscan` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: input failure. The tool could not read or parse the
///   input, configuration or registry at all.
/// - Exit code **1**: logical failure. The tool ran to completion but the
///   answer is negative (no RUN found, a RUN failed its check digit, a door
///   decision was refused).
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `runscan` CLI can produce.
///
/// Use [`CliError::exit_code`] to obtain the exit code associated with each
/// variant. [`CliError::message`] returns the human-readable error string
/// that should be printed to stderr before exiting.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured [`--max-file-size`] limit.
    FileTooLarge {
        /// A human-readable label for the source (`"-"` for stdin, or the
        /// filesystem path).
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (disk files only; `None` for
        /// stdin where the exact size is unknown).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// A human-readable label for the source.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The extraction settings file is malformed or holds a bad pattern.
    ConfigInvalid {
        /// A human-readable label for the source.
        source: String,
        /// What was wrong with it.
        detail: String,
    },

    /// The registry file could not be parsed.
    RegistryInvalid {
        /// A human-readable label for the source.
        source: String,
        /// What was wrong with it.
        detail: String,
    },

    /// The captured-document JSON could not be parsed.
    CaptureInvalid {
        /// A human-readable label for the source.
        source: String,
        /// What was wrong with it.
        detail: String,
    },

    /// A `check-digit` body is empty or contains a non-digit.
    InvalidBody {
        /// The body as given.
        body: String,
    },

    // --- Exit code 1: logical failures ---
    /// No checksum-valid RUN was found in the OCR text.
    NoRunFound,

    /// One or more RUNs given to `validate` failed their check digit.
    ///
    /// The per-RUN results have already been printed; this variant exists so
    /// `main` can exit with code 1 cleanly.
    InvalidRuns {
        /// How many of the arguments were invalid.
        invalid: usize,
        /// How many arguments were checked.
        total: usize,
    },

    /// A door decision could not be recorded (banned client, no RUN,
    /// unknown client).  Nothing was written.
    DecisionRefused {
        /// Why.
        detail: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2`: input failure (file not found, bad config, etc.).
    /// - `1`: logical failure (no RUN found, invalid RUN).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::ConfigInvalid { .. }
            | Self::RegistryInvalid { .. }
            | Self::CaptureInvalid { .. }
            | Self::InvalidBody { .. } => 2,

            Self::NoRunFound | Self::InvalidRuns { .. } | Self::DecisionRefused { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::ConfigInvalid { source, detail } => {
                format!("error: invalid config {source}: {detail}")
            }
            Self::RegistryInvalid { source, detail } => {
                format!("error: invalid registry {source}: {detail}")
            }
            Self::CaptureInvalid { source, detail } => {
                format!("error: invalid capture {source}: {detail}")
            }
            Self::InvalidBody { body } => {
                format!("error: RUN body must be one or more digits, got {body:?}")
            }
            Self::NoRunFound => "error: no valid RUN found".to_owned(),
            Self::InvalidRuns { invalid, total } => {
                format!("error: {invalid} of {total} RUNs failed validation")
            }
            Self::DecisionRefused { detail } => {
                format!("error: decision not recorded: {detail}")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
