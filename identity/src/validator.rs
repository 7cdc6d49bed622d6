//! The ordered identity-number checks.

use crate::verhoeff::verhoeff_valid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Required length of an identity number.
pub const IDENTITY_LEN: usize = 12;

/// Minimum length of a repeated or sequential digit run that is rejected.
const SUSPICIOUS_RUN: usize = 6;

/// The published example number used in documentation and demos.
const EXAMPLE_NUMBER: &str = "123456789012";

/// Why an identity number was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidReason {
    BadFormat,
    TestNumber,
    SuspiciousPattern,
    ChecksumFailed,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadFormat => "bad format",
            Self::TestNumber => "test number",
            Self::SuspiciousPattern => "suspicious pattern",
            Self::ChecksumFailed => "checksum failed",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    Valid,
    Invalid { reasons: Vec<InvalidReason> },
}

impl Validation {
    fn rejected(reason: InvalidReason) -> Self {
        Self::Invalid {
            reasons: vec![reason],
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Reasons as caller-facing strings; empty when valid.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid { reasons } => reasons.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Validate a raw identity number.
pub fn validate(raw: &str) -> Validation {
    if raw.len() != IDENTITY_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Validation::rejected(InvalidReason::BadFormat);
    }
    let digits = raw.as_bytes();

    if is_denylisted(raw, digits) {
        return Validation::rejected(InvalidReason::TestNumber);
    }
    if has_suspicious_run(digits) {
        return Validation::rejected(InvalidReason::SuspiciousPattern);
    }
    if !verhoeff_valid(raw) {
        return Validation::rejected(InvalidReason::ChecksumFailed);
    }
    Validation::Valid
}

/// All-same-digit strings plus the published example number.
fn is_denylisted(raw: &str, digits: &[u8]) -> bool {
    raw == EXAMPLE_NUMBER || digits.iter().all(|&d| d == digits[0])
}

/// A run of `SUSPICIOUS_RUN` identical digits, or of ascending digits where
/// each is the previous plus one (wrapping 9 → 0).
fn has_suspicious_run(digits: &[u8]) -> bool {
    let mut same = 1;
    let mut ascending = 1;
    for pair in digits.windows(2) {
        let (prev, cur) = (pair[0] - b'0', pair[1] - b'0');
        same = if cur == prev { same + 1 } else { 1 };
        ascending = if cur == (prev + 1) % 10 { ascending + 1 } else { 1 };
        if same >= SUSPICIOUS_RUN || ascending >= SUSPICIOUS_RUN {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(raw: &str) -> Vec<String> {
        validate(raw).reasons()
    }

    #[test]
    fn valid_numbers_pass() {
        for n in ["497318520641", "864209753187", "693508172468", "298765432101"] {
            assert_eq!(validate(n), Validation::Valid, "{n}");
        }
    }

    #[test]
    fn wrong_length_is_bad_format() {
        assert_eq!(reasons(""), vec!["bad format"]);
        assert_eq!(reasons("49731852064"), vec!["bad format"]);
        assert_eq!(reasons("4973185206410"), vec!["bad format"]);
    }

    #[test]
    fn non_digits_are_bad_format() {
        assert_eq!(reasons("49731852064a"), vec!["bad format"]);
        assert_eq!(reasons("4973 1852064"), vec!["bad format"]);
        // 12 bytes but multi-byte characters.
        assert_eq!(reasons("١٢٣٤٥٦"), vec!["bad format"]);
    }

    #[test]
    fn example_number_is_test_number() {
        assert_eq!(reasons("123456789012"), vec!["test number"]);
    }

    #[test]
    fn same_digit_strings_are_test_numbers() {
        for d in 0..=9 {
            let n = d.to_string().repeat(12);
            assert_eq!(reasons(&n), vec!["test number"], "{n}");
        }
    }

    #[test]
    fn repeated_run_is_suspicious() {
        assert_eq!(reasons("111111492738"), vec!["suspicious pattern"]);
        assert_eq!(reasons("400000012343"), vec!["suspicious pattern"]);
    }

    #[test]
    fn five_repeats_are_not_suspicious() {
        assert!(!has_suspicious_run(b"400000912343"));
    }

    #[test]
    fn ascending_run_is_suspicious() {
        assert_eq!(reasons("123456789011"), vec!["suspicious pattern"]);
        assert_eq!(reasons("734567890114"), vec!["suspicious pattern"]);
    }

    #[test]
    fn ascending_run_wraps_nine_to_zero() {
        assert_eq!(reasons("567890123458"), vec!["suspicious pattern"]);
        assert!(has_suspicious_run(b"918901234000"));
    }

    #[test]
    fn descending_runs_are_allowed() {
        assert!(!has_suspicious_run(b"298765432101"));
    }

    #[test]
    fn checksum_failure_reported_last() {
        assert_eq!(reasons("497318520642"), vec!["checksum failed"]);
    }
}
