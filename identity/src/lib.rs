//! Identity-number validation.
//!
//! An identity number is a 12-digit national identifier. Validation runs four
//! checks in order and stops at the first failure:
//! 1. **Format**: exactly 12 ASCII digits.
//! 2. **Denylist**: known placeholder / example numbers.
//! 3. **Pattern**: six or more repeated or ascending-sequential digits.
//! 4. **Checksum**: Verhoeff check over all 12 digits.
//!
//! Validation is a pure function and never fails: it always returns a
//! [`Validation`] value.

pub mod validator;
pub mod verhoeff;

pub use validator::{validate, InvalidReason, Validation, IDENTITY_LEN};
pub use verhoeff::{check_digit, verhoeff_valid};
