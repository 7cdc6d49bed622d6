//! Errors raised when constructing types from untrusted input.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid receipt code: {0}")]
    InvalidReceiptCode(String),

    #[error("duplicate candidate id {0}")]
    DuplicateCandidate(u32),
}
