//! Structured identity-document fields and their normalization.
//!
//! The capture SDK reports the fields it could read from a card as loose
//! strings.  [`ScannedSubject::from_capture`] turns them into the values the
//! door workflow compares against the client registry: a verified [`Run`],
//! title-cased names and a [`Sex`].
use serde::{Deserialize, Serialize};

use crate::extract::Extractor;
use crate::run::{Run, normalize_document_number};

/// Raw fields read from an identity document.
///
/// Every field is optional; the SDK omits what it could not read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapturedId {
    /// Document number as printed in the machine-readable zone, e.g.
    /// `"12345678K"`.
    pub document_number: Option<String>,
    /// Given names.
    pub first_name: Option<String>,
    /// Family names.
    pub last_name: Option<String>,
    /// Nationality as printed.
    pub nationality: Option<String>,
    /// `"male"`, `"female"`, or whatever the SDK reported.
    pub sex: Option<String>,
    /// Date of birth as reported, in any format.
    pub date_of_birth: Option<String>,
    /// Free OCR text of the card, used when `document_number` is unusable.
    pub ocr_text: Option<String>,
}

/// Sex as printed on the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// `M`.
    Male,
    /// `F`.
    Female,
    /// Any other value reported by the SDK, kept verbatim.
    Other(String),
}

impl Sex {
    /// Interprets an SDK sex field.  `male`/`m` and `female`/`f` are matched
    /// case-insensitively; anything else non-empty is kept as
    /// [`Sex::Other`].
    pub fn from_field(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_lowercase();
        Some(match lower.as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            _ => Self::Other(trimmed.to_owned()),
        })
    }
}

/// The person standing at the door, as far as the scan could tell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScannedSubject {
    /// Verified RUN, if the document number or OCR text yielded one.
    pub run: Option<Run>,
    /// Title-cased given names; empty when unknown.
    pub given_names: String,
    /// Title-cased family names; empty when unknown.
    pub surnames: String,
    /// Trimmed nationality; empty when unknown.
    pub nationality: String,
    /// Sex, when reported.
    pub sex: Option<Sex>,
    /// Trimmed date of birth; empty when unknown.
    pub date_of_birth: String,
}

impl ScannedSubject {
    /// Normalizes a capture using the default [`Extractor`] for the OCR
    /// fallback.
    pub fn from_capture(captured: &CapturedId) -> Self {
        Self::from_capture_with(captured, &Extractor::default())
    }

    /// Normalizes a capture.
    ///
    /// The RUN comes from `document_number` when it normalizes and passes
    /// the check digit; otherwise `extractor` is run over `ocr_text`.
    pub fn from_capture_with(captured: &CapturedId, extractor: &Extractor) -> Self {
        let from_field = captured
            .document_number
            .as_deref()
            .and_then(normalize_document_number)
            .and_then(|n| Run::try_from(n.as_str()).ok());

        let run = from_field.or_else(|| {
            let text = captured.ocr_text.as_deref()?;
            let found = extractor.extract(text)?;
            tracing::debug!(run = %found.run, tier = %found.tier, "RUN taken from OCR text");
            found.to_run()
        });

        Self {
            run,
            given_names: captured.first_name.as_deref().map(format_name).unwrap_or_default(),
            surnames: captured.last_name.as_deref().map(format_name).unwrap_or_default(),
            nationality: trimmed(captured.nationality.as_deref()),
            sex: captured.sex.as_deref().and_then(Sex::from_field),
            date_of_birth: trimmed(captured.date_of_birth.as_deref()),
        }
    }

    /// `true` when both given names and surnames are known.
    pub fn has_full_name(&self) -> bool {
        !self.given_names.is_empty() && !self.surnames.is_empty()
    }
}

fn trimmed(field: Option<&str>) -> String {
    field.map(str::trim).unwrap_or_default().to_owned()
}

/// Title-cases a name: words split on any whitespace (including line breaks
/// from the card layout), first character uppercased, the rest lowercased,
/// joined with single spaces.
///
/// # Examples
///
/// ```
/// use runscan_core::capture::format_name;
///
/// assert_eq!(format_name("  MARÍA\nJOSÉ  "), "María José");
/// ```
pub fn format_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}
