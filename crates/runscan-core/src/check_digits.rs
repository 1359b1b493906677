//! Pure check-digit functions for the Chilean RUN/RUT scheme.
//!
//! These functions are called by the extractor after the candidate regex
//! confirms the input has the `NN.NNN.NNN-C` shape, and by [`crate::run::Run`]
//! at construction time.  Both are zero-allocation: they walk the characters
//! of the input directly.
//!
//! # Algorithm
//!
//! Modulo 11 over a weighted digit sum.  Digits of the body are taken from
//! the rightmost one leftwards, multiplied by the weights `2, 3, 4, 5, 6, 7`
//! repeating, and summed.  With `r = 11 - (sum mod 11)`:
//!
//! - `r == 11` maps to `'0'`
//! - `r == 10` maps to `'K'`
//! - otherwise `r` is the check digit.

/// First weight applied to the rightmost body digit.
const FIRST_WEIGHT: u32 = 2;

/// Last weight before the cycle restarts at [`FIRST_WEIGHT`].
const LAST_WEIGHT: u32 = 7;

/// Computes the expected check character for a RUN body.
///
/// `body` must be a non-empty string of ASCII digits with no separators
/// (e.g. `"12345678"`).  Returns `None` for an empty body or one containing
/// any other character.  The returned character is always a digit or
/// uppercase `'K'`.
///
/// # Examples
///
/// ```
/// use runscan_core::check_digits::expected_check_char;
///
/// assert_eq!(expected_check_char("12345678"), Some('5'));
/// assert_eq!(expected_check_char("16543210"), Some('K'));
/// assert_eq!(expected_check_char("10000004"), Some('0'));
/// assert_eq!(expected_check_char("12a45678"), None);
/// ```
pub fn expected_check_char(body: &str) -> Option<char> {
    mod11_check(body.chars())
}

/// Returns `true` if `candidate` is a RUN whose check character is correct.
///
/// Every `.` is ignored and the first `-` is removed; the last remaining
/// character is the check character (compared case-insensitively) and
/// everything before it is the body.  Inputs with an empty or non-numeric
/// body are rejected rather than erroring.
///
/// # Examples
///
/// ```
/// use runscan_core::check_digits::is_valid_national_id;
///
/// assert!(is_valid_national_id("12.345.678-5"));
/// assert!(is_valid_national_id("16.543.210-k"));
/// assert!(!is_valid_national_id("12.345.678-4"));
/// assert!(!is_valid_national_id(""));
/// ```
pub fn is_valid_national_id(candidate: &str) -> bool {
    // Byte index of the first hyphen; only that one is stripped.
    let hyphen = candidate.find('-');

    let mut significant = candidate
        .char_indices()
        .filter(|&(i, c)| c != '.' && Some(i) != hyphen)
        .map(|(_, c)| c);

    let Some(check) = significant.next_back() else {
        return false;
    };

    mod11_check(significant) == Some(check.to_ascii_uppercase())
}

/// Weighted modulo-11 sum over `body`, given in reading order.
///
/// The sum is reduced as it is accumulated so arbitrarily long bodies cannot
/// overflow.
fn mod11_check<I>(body: I) -> Option<char>
where
    I: DoubleEndedIterator<Item = char>,
{
    let mut sum: u32 = 0;
    let mut weight = FIRST_WEIGHT;
    let mut seen_digit = false;
    for c in body.rev() {
        let digit = c.to_digit(10)?;
        sum = (sum + digit * weight) % 11;
        weight = if weight == LAST_WEIGHT {
            FIRST_WEIGHT
        } else {
            weight + 1
        };
        seen_digit = true;
    }
    if !seen_digit {
        return None;
    }

    match 11 - sum {
        11 => Some('0'),
        10 => Some('K'),
        r => char::from_digit(r, 10),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    /// Every character that can appear in the check position.
    const CHECK_ALPHABET: [char; 11] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'K'];

    #[test]
    fn expected_check_char_reference_body() {
        // 8*2 + 7*3 + 6*4 + 5*5 + 4*6 + 3*7 + 2*2 + 1*3 = 138; 138 % 11 = 6; 11 - 6 = 5.
        assert_eq!(expected_check_char("12345678"), Some('5'));
    }

    #[test]
    fn expected_check_char_maps_eleven_to_zero() {
        assert_eq!(expected_check_char("10000004"), Some('0'));
        assert_eq!(expected_check_char("10000018"), Some('0'));
    }

    #[test]
    fn expected_check_char_maps_ten_to_k() {
        assert_eq!(expected_check_char("16543210"), Some('K'));
        assert_eq!(expected_check_char("7000013"), Some('K'));
    }

    #[test]
    fn expected_check_char_seven_digit_bodies() {
        assert_eq!(expected_check_char("1234567"), Some('4'));
        assert_eq!(expected_check_char("9876543"), Some('3'));
        assert_eq!(expected_check_char("1000000"), Some('9'));
    }

    #[test]
    fn expected_check_char_weight_cycle_restarts_after_seven() {
        // Seven ones: weights 2..=7 then 2 again -> 2+3+4+5+6+7+2 = 29; 29 % 11 = 7; 11 - 7 = 4.
        assert_eq!(expected_check_char("1111111"), Some('4'));
        // Eight ones: ... + 3 = 32; 32 % 11 = 10; 11 - 10 = 1.
        assert_eq!(expected_check_char("11111111"), Some('1'));
    }

    #[test]
    fn expected_check_char_rejects_empty_and_non_digits() {
        assert_eq!(expected_check_char(""), None);
        assert_eq!(expected_check_char("12.345"), None);
        assert_eq!(expected_check_char("1234567K"), None);
        assert_eq!(expected_check_char("１２３"), None);
    }

    #[test]
    fn valid_reference_identifier() {
        assert!(is_valid_national_id("12.345.678-5"));
    }

    #[test]
    fn reference_body_rejects_every_other_check_char() {
        for c in CHECK_ALPHABET {
            let candidate = format!("12.345.678-{c}");
            assert_eq!(
                is_valid_national_id(&candidate),
                c == '5',
                "unexpected result for {candidate}"
            );
        }
    }

    #[test]
    fn check_letter_is_case_insensitive() {
        assert!(is_valid_national_id("16.543.210-K"));
        assert!(is_valid_national_id("16.543.210-k"));
        assert_eq!(
            is_valid_national_id("12.345.678-k"),
            is_valid_national_id("12.345.678-K")
        );
    }

    #[test]
    fn separators_are_optional() {
        assert!(is_valid_national_id("12345678-5"));
        assert!(is_valid_national_id("123456785"));
        assert!(is_valid_national_id("1.234.567-4"));
        assert!(is_valid_national_id("7.000.013-K"));
    }

    #[test]
    fn zero_check_digit_validates() {
        assert!(is_valid_national_id("10.000.004-0"));
        assert!(!is_valid_national_id("10.000.004-K"));
    }

    #[test]
    fn only_first_hyphen_is_stripped() {
        // The second hyphen stays in the body and is not a digit.
        assert!(!is_valid_national_id("12-345678-5"));
    }

    #[test]
    fn corrupted_body_is_rejected() {
        assert!(!is_valid_national_id("12.345.679-5"));
        assert!(!is_valid_national_id("21.345.678-5"));
    }

    #[test]
    fn degenerate_inputs_are_rejected_without_panicking() {
        assert!(!is_valid_national_id(""));
        assert!(!is_valid_national_id("-"));
        assert!(!is_valid_national_id("..."));
        assert!(!is_valid_national_id("5"));
        assert!(!is_valid_national_id("-0"));
        assert!(!is_valid_national_id("AB.CDE.FGH-5"));
        assert!(!is_valid_national_id("12.345.678-Ñ"));
    }

    #[test]
    fn agrees_with_expected_check_char() {
        for body in ["12345678", "9876543", "20123456", "16543210", "10000004"] {
            let check = expected_check_char(body).expect("digit body");
            assert!(is_valid_national_id(&format!("{body}-{check}")));
        }
    }
}
