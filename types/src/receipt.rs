//! Vote receipts.

use crate::{CandidateId, Timestamp, TypesError, VoterHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A receipt code: `VR-` followed by 16 upper-case hex characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptCode(String);

impl ReceiptCode {
    pub const PREFIX: &'static str = "VR-";
    const BODY_LEN: usize = 16;

    /// Build a code from 8 random bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode_upper(bytes)))
    }

    /// Parse a code supplied by a caller.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let body = raw
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypesError::InvalidReceiptCode(raw.to_string()))?;
        let well_formed = body.len() == Self::BODY_LEN
            && body
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b));
        if !well_formed {
            return Err(TypesError::InvalidReceiptCode(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof-of-inclusion artifact, created once per successful vote and
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_code: ReceiptCode,
    pub voter_handle: VoterHandle,
    pub candidate_id: CandidateId,
    pub timestamp: Timestamp,
    pub transaction_ref: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_round_trips_through_parse() {
        let code = ReceiptCode::from_bytes([0xde, 0xad, 0xbe, 0xef, 0, 1, 2, 3]);
        assert_eq!(code.as_str(), "VR-DEADBEEF00010203");
        assert_eq!(ReceiptCode::parse(code.as_str()).unwrap(), code);
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        assert!(ReceiptCode::parse("DEADBEEF00010203").is_err());
        assert!(ReceiptCode::parse("VR-deadbeef00010203").is_err());
        assert!(ReceiptCode::parse("VR-DEAD").is_err());
        assert!(ReceiptCode::parse("VR-ZZZZZZZZZZZZZZZZ").is_err());
    }
}
