//! Single-use, time-boxed security tokens.

use crate::{Timestamp, VoterHandle};
use serde::{Deserialize, Serialize};

/// Server-side record of an issued token.
///
/// Moves `unused → used` at most once and is never valid after `expires_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityToken {
    /// Hex-encoded HMAC tag.
    pub token: String,
    pub expires_at: Timestamp,
    pub bound_voter_handle: VoterHandle,
    pub used: bool,
}

impl SecurityToken {
    pub fn issued(token: String, expires_at: Timestamp, bound: VoterHandle) -> Self {
        Self {
            token,
            expires_at,
            bound_voter_handle: bound,
            used: false,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    pub fn consumed(&self) -> Self {
        Self {
            used: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_strictly_after() {
        let t = SecurityToken::issued(
            "ab".into(),
            Timestamp::new(1_000),
            VoterHandle::from_digest([3; 32]),
        );
        assert!(!t.is_expired(Timestamp::new(1_000)));
        assert!(t.is_expired(Timestamp::new(1_001)));
    }

    #[test]
    fn consumed_flips_only_used() {
        let t = SecurityToken::issued(
            "ab".into(),
            Timestamp::new(1_000),
            VoterHandle::from_digest([3; 32]),
        );
        let c = t.consumed();
        assert!(c.used);
        assert_eq!(c.token, t.token);
        assert_eq!(c.expires_at, t.expires_at);
    }
}
