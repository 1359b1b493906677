//! Validated RUN newtype and document-number normalization.
//!
//! [`Run`] enforces both the lexical shape and the check digit at
//! construction time via [`TryFrom<&str>`].  Once constructed it is
//! immutable.  The serde `Deserialize` impl re-runs validation so an invalid
//! RUN cannot enter the type system from untrusted JSON.
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::check_digits::expected_check_char;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when parsing a [`Run`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// The string does not have the shape of a RUN.
    #[error("invalid RUN: expected NN.NNN.NNN-C (e.g. 12.345.678-5), got {got:?}")]
    InvalidFormat {
        /// The input that was rejected.
        got: String,
    },

    /// The shape is correct but the check character is wrong.
    #[error("invalid RUN {got:?}: check character should be {expected}")]
    CheckDigitMismatch {
        /// The input that was rejected.
        got: String,
        /// The check character computed from the body.
        expected: char,
    },
}

// ---------------------------------------------------------------------------
// Regex statics
// ---------------------------------------------------------------------------

/// Dotted, hyphenated or bare forms: `12.345.678-5`, `12345678-5`,
/// `123456785`.  Capture groups: body digits (with optional dots), check.
static RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2}\.?[0-9]{3}\.?[0-9]{3})-?([0-9Kk])$")
        .unwrap_or_else(|_| {
            // Never reached: the pattern above is always valid.
            Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
        })
});

/// Document-number field as reported by the capture SDK: 7 or 8 digits,
/// optional hyphen, check character.
static DOCUMENT_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{7,8})-?([0-9Kk])$")
        .unwrap_or_else(|_| {
            // Never reached: the pattern above is always valid.
            Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
        })
});

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// A Chilean RUN/RUT whose check character has been verified.
///
/// Displayed in the dotted form `12.345.678-K`.  Ordering follows the
/// numeric body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Run {
    body: u32,
    check: char,
}

impl Run {
    /// Returns the numeric body (the digits before the check character).
    pub fn body(&self) -> u32 {
        self.body
    }

    /// Returns the check character: a digit or uppercase `'K'`.
    pub fn check_char(&self) -> char {
        self.check
    }

    /// Returns the dotted form, e.g. `"12.345.678-5"`.
    pub fn dotted(&self) -> String {
        format!(
            "{}.{:03}.{:03}-{}",
            self.body / 1_000_000,
            (self.body / 1_000) % 1_000,
            self.body % 1_000,
            self.check
        )
    }

    /// Returns the compact form without thousands separators, e.g.
    /// `"12345678-5"`.
    pub fn compact(&self) -> String {
        format!("{}-{}", self.body, self.check)
    }
}

impl TryFrom<&str> for Run {
    type Error = RunError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let invalid = || RunError::InvalidFormat { got: s.to_owned() };

        let caps = RUN_RE.captures(s).ok_or_else(invalid)?;
        let (Some(body_match), Some(check_match)) = (caps.get(1), caps.get(2)) else {
            return Err(invalid());
        };

        let digits: String = body_match
            .as_str()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let body: u32 = digits.parse().map_err(|_| invalid())?;
        let check = check_match.as_str().to_ascii_uppercase();

        let expected = expected_check_char(&digits).ok_or_else(invalid)?;
        if check.chars().eq([expected]) {
            Ok(Self {
                body,
                check: expected,
            })
        } else {
            Err(RunError::CheckDigitMismatch {
                got: s.to_owned(),
                expected,
            })
        }
    }
}

impl FromStr for Run {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl Serialize for Run {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.dotted())
    }
}

impl<'de> Deserialize<'de> for Run {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Document numbers
// ---------------------------------------------------------------------------

/// Normalizes a document-number field from the capture SDK to `NNNNNNNN-C`.
///
/// Accepts 7 or 8 digits followed by the check character, with or without a
/// hyphen, after trimming surrounding whitespace.  The check letter is
/// uppercased.  No check-digit verification happens here; parse the result
/// into a [`Run`] for that.
///
/// # Examples
///
/// ```
/// use runscan_core::normalize_document_number;
///
/// assert_eq!(normalize_document_number("16543210k").as_deref(), Some("16543210-K"));
/// assert_eq!(normalize_document_number(" 12345678-5 ").as_deref(), Some("12345678-5"));
/// assert_eq!(normalize_document_number("A1234567"), None);
/// ```
pub fn normalize_document_number(raw: &str) -> Option<String> {
    let caps = DOCUMENT_NUMBER_RE.captures(raw.trim())?;
    let body = caps.get(1)?.as_str();
    let check = caps.get(2)?.as_str().to_ascii_uppercase();
    Some(format!("{body}-{check}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn run(s: &str) -> Run {
        Run::try_from(s).expect("valid RUN")
    }

    #[test]
    fn parses_dotted_form() {
        let r = run("12.345.678-5");
        assert_eq!(r.body(), 12_345_678);
        assert_eq!(r.check_char(), '5');
    }

    #[test]
    fn parses_compact_and_bare_forms() {
        assert_eq!(run("12345678-5"), run("12.345.678-5"));
        assert_eq!(run("123456785"), run("12.345.678-5"));
        assert_eq!(run("1234567-4"), run("1.234.567-4"));
    }

    #[test]
    fn lowercase_k_is_normalized() {
        let r = run("16.543.210-k");
        assert_eq!(r.check_char(), 'K');
        assert_eq!(r, run("16.543.210-K"));
    }

    #[test]
    fn dotted_and_compact_rendering() {
        let r = run("7000013k");
        assert_eq!(r.dotted(), "7.000.013-K");
        assert_eq!(r.compact(), "7000013-K");
        assert_eq!(r.to_string(), "7.000.013-K");
    }

    #[test]
    fn zero_padding_in_groups() {
        assert_eq!(run("10000004-0").dotted(), "10.000.004-0");
    }

    #[test]
    fn wrong_check_digit_reports_expected() {
        let err = Run::try_from("12.345.678-4").expect_err("bad check digit");
        assert_eq!(
            err,
            RunError::CheckDigitMismatch {
                got: "12.345.678-4".to_owned(),
                expected: '5',
            }
        );
        assert!(err.to_string().contains("should be 5"));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for bad in [
            "",
            "12.345.678",
            "12.345.678-",
            "123.456.789-5",
            "12.345.678-X",
            "12-345-678-5",
            " 12.345.678-5",
            "12.34.5678-5",
        ] {
            let err = Run::try_from(bad).expect_err(bad);
            assert!(
                matches!(err, RunError::InvalidFormat { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn from_str_matches_try_from() {
        let parsed: Run = "12.345.678-5".parse().expect("valid RUN");
        assert_eq!(parsed, run("12.345.678-5"));
    }

    #[test]
    fn ordering_follows_body() {
        assert!(run("9.876.543-3") < run("12.345.678-5"));
    }

    #[test]
    fn serde_uses_dotted_form() {
        let json = serde_json::to_string(&run("16543210-k")).expect("serialize");
        assert_eq!(json, r#""16.543.210-K""#);
        let back: Run = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, run("16.543.210-K"));
    }

    #[test]
    fn serde_rejects_invalid_check_digit() {
        let result: Result<Run, _> = serde_json::from_str(r#""12.345.678-4""#);
        assert!(result.is_err());
    }

    #[test]
    fn document_number_hyphen_is_inserted() {
        assert_eq!(
            normalize_document_number("123456785").as_deref(),
            Some("12345678-5")
        );
        assert_eq!(
            normalize_document_number("1234567k").as_deref(),
            Some("1234567-K")
        );
    }

    #[test]
    fn document_number_with_hyphen_is_kept() {
        assert_eq!(
            normalize_document_number("12345678-5").as_deref(),
            Some("12345678-5")
        );
    }

    #[test]
    fn document_number_does_not_verify_check_digit() {
        assert_eq!(
            normalize_document_number("12345678-4").as_deref(),
            Some("12345678-4")
        );
    }

    #[test]
    fn document_number_rejects_other_shapes() {
        assert_eq!(normalize_document_number(""), None);
        assert_eq!(normalize_document_number("123456"), None);
        assert_eq!(normalize_document_number("1234567890"), None);
        assert_eq!(normalize_document_number("12.345.678-5"), None);
        assert_eq!(normalize_document_number("A12345678"), None);
    }
}
