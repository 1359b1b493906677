//! RUN extraction from noisy OCR text.
//!
//! A scanned identity card yields a block of text with several numeric fields
//! that share the RUN shape, most notably the card's own serial number
//! printed next to a `NÚMERO DOCUMENTO` label.  [`Extractor::extract`] finds
//! every substring shaped like `NN.NNN.NNN-C`, inspects the text around each
//! one, and picks at most one checksum-valid candidate using three ordered
//! passes (see [`Tier`]).
//!
//! The extractor is pure: it performs no I/O and keeps no state between calls,
//! so one instance can be shared freely across threads.
use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::check_digits::is_valid_national_id;
use crate::run::Run;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Characters inspected on each side of a candidate's start offset.
pub const DEFAULT_CONTEXT_RADIUS: usize = 40;

/// Label printed next to the card serial number, which is not a RUN.
pub const DEFAULT_DOCUMENT_LABEL: &str = r"N[ÚU]MERO\s+DOCUMENTO";

/// Labels that explicitly introduce the holder's RUN.
pub const DEFAULT_RUN_LABEL: &str = "RUN|RUT";

// ---------------------------------------------------------------------------
// Compiled regex patterns
// ---------------------------------------------------------------------------

/// Lexical shape of a RUN in uppercased text.  Word boundaries are ASCII so
/// that accented letters next to a number behave like any other letter.
static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{1,2}\.[0-9]{3}\.[0-9]{3}-[0-9K](?-u:\b)")
        .unwrap_or_else(|_| {
            // Never reached: the pattern above is always valid.
            Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
        })
});

static DOCUMENT_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(DEFAULT_DOCUMENT_LABEL).unwrap_or_else(|_| never_matches()));

static RUN_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(DEFAULT_RUN_LABEL).unwrap_or_else(|_| never_matches()));

static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(|| Extractor {
    context_radius: DEFAULT_CONTEXT_RADIUS,
    document_label: DOCUMENT_LABEL_RE.clone(),
    run_label: RUN_LABEL_RE.clone(),
});

fn label_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

// Only reachable if one of the literal default patterns above fails to
// compile, which the unit tests rule out.
fn never_matches() -> Regex {
    Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Errors produced when an [`ExtractConfig`] cannot be turned into an
/// [`Extractor`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// One of the label patterns is not a valid regular expression.
    #[error("invalid `{field}` pattern: {source}")]
    InvalidPattern {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The regex compilation error.
        source: regex::Error,
    },

    /// The configuration document could not be parsed.
    #[error("invalid extraction config: {detail}")]
    Parse {
        /// Human-readable description of the parse failure.
        detail: String,
    },
}

/// Tunable constants of the disambiguation heuristic.
///
/// The defaults reproduce the behaviour tuned against Chilean identity cards.
/// Every field is optional when deserializing; missing fields take their
/// default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Characters taken before and after a candidate's start offset to form
    /// its context window.
    pub context_radius: usize,
    /// Pattern identifying a non-RUN serial-number label.
    pub document_label: String,
    /// Pattern identifying an explicit RUN/RUT label.
    pub run_label: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
            document_label: DEFAULT_DOCUMENT_LABEL.to_owned(),
            run_label: DEFAULT_RUN_LABEL.to_owned(),
        }
    }
}

impl ExtractConfig {
    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `json` is malformed or names an
    /// unknown field.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            detail: format!("line {}, column {}: {e}", e.line(), e.column()),
        })
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A substring of the uppercased input that has the RUN shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// The matched text, e.g. `"12.345.678-K"`.
    pub text: String,
    /// Byte offset of the match in the uppercased input.
    pub offset: usize,
    /// Whether the check character is correct.
    pub valid: bool,
}

/// The selection pass that produced an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// No serial-number label appears near the candidate.
    Unlabelled,
    /// A RUN/RUT label appears near the candidate, or it is the only
    /// candidate within its own window.
    Labelled,
    /// First checksum-valid candidate, context ignored.
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlabelled => f.write_str("unlabelled"),
            Self::Labelled => f.write_str("labelled"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// A RUN selected from OCR text, together with how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// The selected RUN in uppercase-normalized form, e.g. `"16.543.210-K"`.
    pub run: String,
    /// Byte offset of `run` in the uppercased input.
    pub offset: usize,
    /// The pass that selected it.
    pub tier: Tier,
    /// Every candidate found, in order of appearance.
    pub candidates: Vec<Candidate>,
}

impl Extraction {
    /// Parses the selected text into a [`Run`].
    ///
    /// Always `Some` for an extraction produced by [`Extractor::extract`],
    /// which only selects checksum-valid candidates.
    pub fn to_run(&self) -> Option<Run> {
        Run::try_from(self.run.as_str()).ok()
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Locates the holder's RUN in OCR text.
///
/// Construct with [`Extractor::new`] for a custom [`ExtractConfig`], or use
/// [`Extractor::default`] for the tuned defaults.  Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Extractor {
    context_radius: usize,
    document_label: Regex,
    run_label: Regex,
}

impl Default for Extractor {
    fn default() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }
}

/// A candidate paired with its context window, both borrowed from the
/// uppercased text.
struct Scanned<'t> {
    index: usize,
    window: &'t str,
    valid: bool,
}

impl Extractor {
    /// Builds an extractor from `config`, compiling its label patterns
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if either label pattern fails
    /// to compile.
    pub fn new(config: &ExtractConfig) -> Result<Self, ConfigError> {
        let document_label =
            label_regex(&config.document_label).map_err(|source| ConfigError::InvalidPattern {
                field: "document_label",
                source,
            })?;
        let run_label =
            label_regex(&config.run_label).map_err(|source| ConfigError::InvalidPattern {
                field: "run_label",
                source,
            })?;
        Ok(Self {
            context_radius: config.context_radius,
            document_label,
            run_label,
        })
    }

    /// Returns the context radius in characters.
    pub fn context_radius(&self) -> usize {
        self.context_radius
    }

    /// Returns every RUN-shaped substring of `text`, in order of appearance.
    ///
    /// Matching runs over the uppercased text, so a trailing `k` is reported
    /// as `K`.  Candidates are reported whether or not their check character
    /// is correct.
    pub fn candidates(&self, text: &str) -> Vec<Candidate> {
        find_candidates(&text.to_uppercase())
    }

    /// Selects the most plausible checksum-valid RUN in `text`.
    ///
    /// Three passes run over the candidates in order of appearance, and the
    /// first candidate accepted by the earliest pass wins:
    ///
    /// 1. [`Tier::Unlabelled`]: valid, and its window does not match the
    ///    document label.
    /// 2. [`Tier::Labelled`]: valid, and its window matches the RUN label or
    ///    holds no other complete candidate.
    /// 3. [`Tier::Fallback`]: valid.
    ///
    /// Returns `None` when no candidate has a correct check character.
    pub fn extract(&self, text: &str) -> Option<Extraction> {
        let upper = text.to_uppercase();
        let candidates = find_candidates(&upper);
        if candidates.is_empty() {
            tracing::debug!("no RUN-shaped candidates in input");
            return None;
        }

        let scanned: Vec<Scanned<'_>> = candidates
            .iter()
            .enumerate()
            .map(|(index, c)| Scanned {
                index,
                window: context_window(&upper, c.offset, self.context_radius),
                valid: c.valid,
            })
            .collect();

        for (s, c) in scanned.iter().zip(&candidates) {
            tracing::trace!(
                candidate = %c.text,
                offset = c.offset,
                valid = c.valid,
                window = s.window,
                "scanned candidate"
            );
        }

        let Some((index, tier)) = self.select(&scanned) else {
            tracing::debug!(
                candidates = candidates.len(),
                "no candidate passed the check digit"
            );
            return None;
        };

        let chosen = &candidates[index];
        tracing::debug!(run = %chosen.text, offset = chosen.offset, %tier, "selected RUN");
        Some(Extraction {
            run: chosen.text.clone(),
            offset: chosen.offset,
            tier,
            candidates,
        })
    }

    /// Runs the three selection passes and returns the winning index.
    fn select(&self, scanned: &[Scanned<'_>]) -> Option<(usize, Tier)> {
        let first_valid = scanned.iter().find(|s| s.valid)?;

        let unlabelled = scanned
            .iter()
            .filter(|s| s.valid)
            .find(|s| !self.document_label.is_match(s.window));
        if let Some(s) = unlabelled {
            return Some((s.index, Tier::Unlabelled));
        }

        let labelled = scanned
            .iter()
            .filter(|s| s.valid)
            .find(|s| self.run_label.is_match(s.window) || is_alone_in_window(s.window));
        if let Some(s) = labelled {
            return Some((s.index, Tier::Labelled));
        }

        Some((first_valid.index, Tier::Fallback))
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Returns the holder's RUN from `ocr_text` using the default configuration.
///
/// The result is the uppercase-normalized match (e.g. `"16.543.210-K"`) and
/// always passes [`is_valid_national_id`].
///
/// # Examples
///
/// ```
/// use runscan_core::extract_national_id;
///
/// let text = "NÚMERO DOCUMENTO 11.111.111-2\nRUN 12.345.678-5";
/// assert_eq!(extract_national_id(text).as_deref(), Some("12.345.678-5"));
/// assert_eq!(extract_national_id("no identifiers here"), None);
/// ```
pub fn extract_national_id(ocr_text: &str) -> Option<String> {
    DEFAULT_EXTRACTOR.extract(ocr_text).map(|e| e.run)
}

fn find_candidates(upper: &str) -> Vec<Candidate> {
    CANDIDATE_RE
        .find_iter(upper)
        .map(|m| Candidate {
            text: m.as_str().to_owned(),
            offset: m.start(),
            valid: is_valid_national_id(m.as_str()),
        })
        .collect()
}

/// `true` when the window holds exactly one complete RUN-shaped match.
fn is_alone_in_window(window: &str) -> bool {
    CANDIDATE_RE.find_iter(window).take(2).count() == 1
}

/// Returns the slice of `text` spanning `radius` characters before and after
/// the byte offset `start`, clamped to the text bounds.
///
/// `start` must lie on a character boundary.
fn context_window(text: &str, start: usize, radius: usize) -> &str {
    let Some((before, after)) = text.split_at_checked(start) else {
        return "";
    };
    let lo = before
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let hi = after
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| start + i);
    &text[lo..hi]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;

    fn extract(text: &str) -> Option<Extraction> {
        Extractor::default().extract(text)
    }

    // ── defaults ─────────────────────────────────────────────────────────────

    #[test]
    fn default_patterns_compile() {
        assert!(label_regex(DEFAULT_DOCUMENT_LABEL).is_ok());
        assert!(label_regex(DEFAULT_RUN_LABEL).is_ok());
        assert!(CANDIDATE_RE.is_match("12.345.678-5"));
    }

    #[test]
    fn default_extractor_matches_default_config() {
        let built = Extractor::new(&ExtractConfig::default()).expect("default config");
        let text = "NUMERO DOCUMENTO 12.345.678-5 / 11.111.111-2";
        assert_eq!(built.extract(text), extract(text));
        assert_eq!(built.context_radius(), DEFAULT_CONTEXT_RADIUS);
    }

    // ── candidate discovery ──────────────────────────────────────────────────

    #[test]
    fn candidates_report_offsets_in_order() {
        let found = Extractor::default().candidates("A 12.345.678-5 B 9.876.543-3");
        let texts: Vec<&str> = found.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["12.345.678-5", "9.876.543-3"]);
        assert_eq!(found[0].offset, 2);
        assert_eq!(found[1].offset, 17);
        assert!(found.iter().all(|c| c.valid));
    }

    #[test]
    fn candidates_include_invalid_check_digits() {
        let found = Extractor::default().candidates("11.111.111-2");
        assert_eq!(found.len(), 1);
        assert!(!found[0].valid);
    }

    #[test]
    fn candidates_are_uppercased() {
        let found = Extractor::default().candidates("run 16.543.210-k");
        assert_eq!(found[0].text, "16.543.210-K");
    }

    #[test]
    fn candidate_requires_word_boundaries() {
        let ex = Extractor::default();
        assert!(ex.candidates("112.345.678-5").is_empty());
        assert!(ex.candidates("12.345.678-55").is_empty());
        assert!(ex.candidates("RUN12.345.678-5").is_empty());
        assert_eq!(ex.candidates("RUN:12.345.678-5").len(), 1);
        assert_eq!(ex.candidates("(12.345.678-5)").len(), 1);
    }

    #[test]
    fn candidate_requires_dotted_shape() {
        let ex = Extractor::default();
        assert!(ex.candidates("12345678-5").is_empty());
        assert!(ex.candidates("12.345.6785").is_empty());
        assert!(ex.candidates("12,345,678-5").is_empty());
        assert!(ex.candidates("12.345.678-X").is_empty());
    }

    // ── context window ───────────────────────────────────────────────────────

    #[test]
    fn context_window_clamps_to_text_bounds() {
        assert_eq!(context_window("abc", 1, 40), "abc");
        assert_eq!(context_window("", 0, 40), "");
    }

    #[test]
    fn context_window_counts_characters_not_bytes() {
        let text = "ÚÚÚÚ12";
        let start = text.find('1').expect("digit");
        assert_eq!(context_window(text, start, 2), "ÚÚ12");
    }

    #[test]
    fn context_window_after_side_starts_at_candidate() {
        let text = "0123456789";
        assert_eq!(context_window(text, 5, 2), "3456");
        assert_eq!(context_window(text, 5, 0), "");
    }

    #[test]
    fn context_window_rejects_out_of_range_offset() {
        assert_eq!(context_window("abc", 10, 2), "");
    }

    // ── selection tiers ──────────────────────────────────────────────────────

    #[test]
    fn run_label_beats_document_serial() {
        let text = "CEDULA DE IDENTIDAD\n\
                    NUMERO DOCUMENTO 11.111.111-2\n\
                    APELLIDOS GONZALEZ PEREZ\n\
                    NOMBRES MARIA JOSE\n\
                    RUN 12.345.678-5";
        let got = extract(text).expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
        assert_eq!(got.tier, Tier::Unlabelled);
        assert_eq!(got.candidates.len(), 2);
    }

    #[test]
    fn valid_serial_next_to_label_loses_to_distant_run() {
        // Both numbers pass the check digit; only the second is far from the
        // serial-number label.
        let text = "NÚMERO DOCUMENTO 9.876.543-3\n\
                    NACIONALIDAD CHILENA SEXO F FECHA DE NACIMIENTO 01 ENE 1990\n\
                    12.345.678-5";
        let got = extract(text).expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
        assert_eq!(got.tier, Tier::Unlabelled);
    }

    #[test]
    fn labelled_tier_when_all_valid_candidates_sit_near_document_label() {
        let text = "RUN 12.345.678-5 NÚMERO DOCUMENTO 9.876.543-3";
        let got = extract(text).expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
        assert_eq!(got.tier, Tier::Labelled);
    }

    #[test]
    fn single_candidate_near_document_label_is_labelled_tier() {
        let got = extract("NUMERO DOCUMENTO 12.345.678-5").expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
        assert_eq!(got.tier, Tier::Labelled);
    }

    #[test]
    fn fallback_tier_when_crowded_and_unlabelled() {
        let text = "NUMERO DOCUMENTO 12.345.678-5 / 11.111.111-2";
        let got = extract(text).expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
        assert_eq!(got.tier, Tier::Fallback);
    }

    #[test]
    fn first_valid_candidate_wins_within_a_tier() {
        let got = extract("9.876.543-3 12.345.678-5").expect("a RUN");
        assert_eq!(got.run, "9.876.543-3");
        assert_eq!(got.offset, 0);
    }

    #[test]
    fn later_unlabelled_candidate_beats_earlier_labelled_one() {
        // The first RUN sits next to both labels; the second is far from
        // either.  The unlabelled pass runs over every candidate first.
        let text = format!("RUN 12.345.678-5 NUMERO DOCUMENTO{}9.876.543-3", " ".repeat(45));
        let got = extract(&text).expect("a RUN");
        assert_eq!(got.run, "9.876.543-3");
        assert_eq!(got.offset, 78);
        assert_eq!(got.tier, Tier::Unlabelled);
    }

    #[test]
    fn doubly_labelled_candidate_is_labelled_tier_when_alone() {
        let text = format!("RUN 12.345.678-5 NUMERO DOCUMENTO{}LOTE", " ".repeat(45));
        let got = extract(&text).expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
        assert_eq!(got.tier, Tier::Labelled);
    }

    #[test]
    fn single_unlabelled_valid_candidate_is_accepted() {
        let got = extract("APELLIDOS\nSOTO\n12.345.678-5\nCHILENA").expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
    }

    // ── not found ────────────────────────────────────────────────────────────

    #[test]
    fn invalid_only_candidate_is_never_returned() {
        assert_eq!(extract("RUN 11.111.111-2"), None);
        assert_eq!(extract_national_id("11.111.111-2"), None);
    }

    #[test]
    fn empty_and_patternless_inputs_are_not_found() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("REPUBLICA DE CHILE\nCEDULA DE IDENTIDAD"), None);
        assert_eq!(extract("12345678-5"), None);
    }

    #[test]
    fn many_invalid_candidates_are_not_found() {
        let text = "11.111.111-2 22.222.222-3 NUMERO DOCUMENTO 12.345.678-4";
        assert_eq!(extract(text), None);
    }

    // ── normalization ────────────────────────────────────────────────────────

    #[test]
    fn lowercase_check_letter_is_normalized() {
        assert_eq!(
            extract_national_id("run 16.543.210-k").as_deref(),
            Some("16.543.210-K")
        );
        assert_eq!(
            extract_national_id("run 16.543.210-k"),
            extract_national_id("RUN 16.543.210-K")
        );
    }

    #[test]
    fn lowercase_labels_are_recognised() {
        let text = "número documento 12.345.678-5";
        let got = extract(text).expect("a RUN");
        assert_eq!(got.tier, Tier::Labelled);
    }

    #[test]
    fn offsets_refer_to_uppercased_text() {
        let text = "ñ 12.345.678-5";
        let got = extract(text).expect("a RUN");
        let upper = text.to_uppercase();
        assert_eq!(&upper[got.offset..got.offset + got.run.len()], got.run);
    }

    #[test]
    fn extraction_converts_to_run() {
        let got = extract("RUN 16.543.210-k").expect("a RUN");
        let run = got.to_run().expect("valid RUN");
        assert_eq!(run.dotted(), "16.543.210-K");
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "NUMERO DOCUMENTO 9.876.543-3 RUN 12.345.678-5";
        assert_eq!(extract(text), extract(text));
    }

    // ── configuration ────────────────────────────────────────────────────────

    #[test]
    fn narrow_radius_hides_document_label() {
        let config = ExtractConfig {
            context_radius: 5,
            ..ExtractConfig::default()
        };
        let ex = Extractor::new(&config).expect("valid config");
        let got = ex.extract("NUMERO DOCUMENTO 12.345.678-5").expect("a RUN");
        assert_eq!(got.tier, Tier::Unlabelled);
    }

    #[test]
    fn custom_document_label_is_honoured() {
        let config = ExtractConfig {
            document_label: "SERIE".to_owned(),
            ..ExtractConfig::default()
        };
        let ex = Extractor::new(&config).expect("valid config");
        let got = ex
            .extract("SERIE 9.876.543-3 ...................................... 12.345.678-5")
            .expect("a RUN");
        assert_eq!(got.run, "12.345.678-5");
    }

    #[test]
    fn invalid_pattern_is_reported_with_field_name() {
        let config = ExtractConfig {
            run_label: "RUN(".to_owned(),
            ..ExtractConfig::default()
        };
        let err = Extractor::new(&config).expect_err("unbalanced group");
        match &err {
            ConfigError::InvalidPattern { field, .. } => assert_eq!(*field, "run_label"),
            ConfigError::Parse { .. } => panic!("expected InvalidPattern, got {err:?}"),
        }
        assert!(err.to_string().contains("run_label"));
    }

    #[test]
    fn config_from_json_fills_defaults() {
        let config = ExtractConfig::from_json(r#"{"context_radius": 12}"#).expect("valid json");
        assert_eq!(config.context_radius, 12);
        assert_eq!(config.document_label, DEFAULT_DOCUMENT_LABEL);
        assert_eq!(config.run_label, DEFAULT_RUN_LABEL);
    }

    #[test]
    fn config_from_json_rejects_unknown_fields() {
        let err = ExtractConfig::from_json(r#"{"radius": 12}"#).expect_err("unknown field");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn tier_serializes_in_snake_case() {
        let json = serde_json::to_string(&Tier::Unlabelled).expect("serialize");
        assert_eq!(json, r#""unlabelled""#);
        assert_eq!(Tier::Fallback.to_string(), "fallback");
    }
}
