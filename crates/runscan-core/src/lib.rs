#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod capture;
pub mod check_digits;
pub mod decisions;
pub mod extract;
pub mod registry;
pub mod run;

pub use capture::{CapturedId, ScannedSubject, Sex, format_name};
pub use check_digits::{expected_check_char, is_valid_national_id};
pub use decisions::{
    BanDecision, DailyStats, DecisionError, DecisionLog, Incident, Visit, admit, ban_subject,
};
pub use extract::{
    Candidate, ConfigError, DEFAULT_CONTEXT_RADIUS, ExtractConfig, Extraction, Extractor, Tier,
    extract_national_id,
};
pub use registry::{
    ClientRecord, ClientRegistry, ClientStatus, GuestEntry, MemoryRegistry, RegistryError,
    Screening, screen,
};
pub use run::{Run, RunError, normalize_document_number};

/// Returns the current version of the runscan-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }

    #[test]
    fn top_level_functions_agree() {
        let text = "NUMERO DOCUMENTO 9.876.543-3 RUN 12.345.678-5";
        let found = extract_national_id(text).expect("RUN");
        assert!(is_valid_national_id(&found));
    }
}
