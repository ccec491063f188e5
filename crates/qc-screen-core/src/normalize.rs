//! Text and part-number normalization
//!
//! Part numbers in the daily sheets are typed by hand, so the same part shows
//! up as `5001-AB`, `5OO1 AB` or `5001/ab`. Everything that compares part
//! numbers or defect names goes through these functions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Four or more digits, a `-` or `/`, then alphanumerics
static PART_NUMBER_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4,}[-/][A-Z0-9]+").expect("valid part number pattern"));

/// Trim, uppercase and collapse every whitespace run to one space.
///
/// ```
/// use qc_screen_core::normalize_text;
/// assert_eq!(normalize_text("  Pin  Hole "), "PIN HOLE");
/// ```
pub fn normalize_text(value: &str) -> String {
    value
        .trim()
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical form of a part number.
///
/// Uppercases, folds the letter `O` into the digit `0` and drops everything
/// outside `A-Z0-9`. Idempotent.
///
/// ```
/// use qc_screen_core::normalize_part_number;
/// assert_eq!(normalize_part_number("o123-A4"), "0123A4");
/// ```
pub fn normalize_part_number(value: &str) -> String {
    value
        .trim()
        .to_uppercase()
        .chars()
        .map(|c| if c == 'O' { '0' } else { c })
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Whether `value` contains a part-number-shaped token (case-insensitive)
pub fn is_part_number_shaped(value: &str) -> bool {
    PART_NUMBER_SHAPE.is_match(&value.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Pin  Hole "), "PIN HOLE");
        assert_eq!(normalize_text("scratch\t\nmark"), "SCRATCH MARK");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_part_number_folds_o_and_case() {
        assert_eq!(normalize_part_number("o123-A4"), "0123A4");
        assert_eq!(normalize_part_number("0123-a4"), "0123A4");
        assert_eq!(normalize_part_number(" 5001 / ab "), "5001AB");
    }

    #[test]
    fn test_normalize_part_number_keeps_digit_sequences_apart() {
        assert_ne!(
            normalize_part_number("5001-AB"),
            normalize_part_number("5002-AB")
        );
    }

    #[test]
    fn test_part_number_shape() {
        assert!(is_part_number_shaped("1234-AB"));
        assert!(is_part_number_shaped("20231/X9"));
        assert!(is_part_number_shaped("part 5001-ab rev"));
        assert!(!is_part_number_shaped("ABC-123"));
        assert!(!is_part_number_shaped("123-A"));
        assert!(!is_part_number_shaped("12345"));
        assert!(!is_part_number_shaped("1234 AB"));
    }

    proptest! {
        #[test]
        fn normalize_part_number_is_idempotent(s in "\\PC{0,24}") {
            let once = normalize_part_number(&s);
            prop_assert_eq!(normalize_part_number(&once), once.clone());
        }

        #[test]
        fn normalize_part_number_output_alphabet(s in "\\PC{0,24}") {
            let out = normalize_part_number(&s);
            prop_assert!(out.chars().all(|c| c.is_ascii_digit() || (c.is_ascii_uppercase() && c != 'O')));
        }

        #[test]
        fn normalize_text_is_idempotent(s in "[ -~\t\n]{0,24}") {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once.clone());
        }
    }
}
