use ballotguard_crypto::CryptoError;
use ballotguard_store::StoreError;
use thiserror::Error;

/// Message returned for every abuse-detector rejection. Deliberately the
/// same for rate limiting and suspicion so thresholds are not revealed.
pub const TRY_AGAIN_LATER: &str = "too many requests, try again later";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("identity validation failed: {}", reasons.join(", "))]
    ValidationError { reasons: Vec<String> },

    #[error("rate limited")]
    RateLimited,

    #[error("source flagged as suspicious")]
    Suspicious,

    #[error("voter is not registered")]
    NotRegistered,

    #[error("voter has already voted")]
    AlreadyVoted,

    #[error("election is closed")]
    ElectionClosed,

    #[error("election not found")]
    ElectionNotFound,

    #[error("candidate not found")]
    CandidateNotFound,

    #[error("receipt not found")]
    ReceiptNotFound,

    #[error("security token has expired")]
    TokenExpired,

    #[error("security token has already been used")]
    TokenAlreadyUsed,

    #[error("security token does not match")]
    TokenMismatch,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("election {0} already exists")]
    ElectionExists(String),

    #[error("invalid election definition: {0}")]
    InvalidElection(String),
}

impl VoteError {
    /// Only store or network trouble is worth retrying; every other kind
    /// is deterministic for the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Stable machine-readable code for transport adapters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::Suspicious => "SUSPICIOUS",
            Self::NotRegistered => "NOT_REGISTERED",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::ElectionClosed => "ELECTION_CLOSED",
            Self::ElectionNotFound => "ELECTION_NOT_FOUND",
            Self::CandidateNotFound => "CANDIDATE_NOT_FOUND",
            Self::ReceiptNotFound => "RECEIPT_NOT_FOUND",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            Self::TokenMismatch => "TOKEN_MISMATCH",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::ElectionExists(_) => "ELECTION_EXISTS",
            Self::InvalidElection(_) => "INVALID_ELECTION",
        }
    }

    /// Text safe to show the caller.
    ///
    /// Validation failures list their reasons; abuse rejections share one
    /// generic message; internal details of `Unavailable` are withheld.
    pub fn public_message(&self) -> String {
        match self {
            Self::ValidationError { reasons } => format!("invalid identity number: {}", reasons.join(", ")),
            Self::RateLimited | Self::Suspicious => TRY_AGAIN_LATER.to_string(),
            Self::Unavailable(_) => "service temporarily unavailable, retry later".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for VoteError {
    fn from(e: StoreError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

impl From<CryptoError> for VoteError {
    fn from(e: CryptoError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(VoteError::Unavailable("x".into()).is_retryable());
        assert!(!VoteError::AlreadyVoted.is_retryable());
        assert!(!VoteError::RateLimited.is_retryable());
    }

    #[test]
    fn abuse_rejections_share_a_generic_message() {
        assert_eq!(VoteError::RateLimited.public_message(), TRY_AGAIN_LATER);
        assert_eq!(VoteError::Suspicious.public_message(), TRY_AGAIN_LATER);
    }

    #[test]
    fn validation_message_lists_reasons() {
        let e = VoteError::ValidationError {
            reasons: vec!["checksum failed".into()],
        };
        assert_eq!(e.public_message(), "invalid identity number: checksum failed");
    }

    #[test]
    fn unavailable_hides_details() {
        let e: VoteError = StoreError::Timeout("db-7.internal:5432".into()).into();
        assert!(!e.public_message().contains("db-7"));
        assert_eq!(e.code(), "UNAVAILABLE");
    }
}
