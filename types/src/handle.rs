//! Voter handles and the salts they are derived with.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a per-derivation salt in bytes.
pub const SALT_LEN: usize = 16;

/// The opaque, non-reversible ledger key for a voter.
///
/// Always 64 lower-case hex characters (a SHA-256 digest).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoterHandle(String);

impl VoterHandle {
    /// Wrap a 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(&digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix safe to put in logs.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for VoterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A random per-derivation salt stored next to the handle it produced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn new(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", hex::encode(&self.0[..4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_from_digest_is_lowercase_hex() {
        let h = VoterHandle::from_digest([0xab; 32]);
        assert_eq!(h.as_str().len(), 64);
        assert!(h.as_str().starts_with("abab"));
        assert_eq!(h.short(), "abababab");
    }
}
