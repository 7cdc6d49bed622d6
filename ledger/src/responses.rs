//! Caller-facing response shapes.
//!
//! Transport adapters serialize these as they are; field names follow the
//! camelCase shapes callers of the voting API expect.

use crate::VoteError;
use ballotguard_types::{CandidateId, Election, Receipt, ReceiptCode, Timestamp, VoterHandle};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_handle: Option<VoterHandle>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteResponse {
    pub success: bool,
    pub receipt_code: ReceiptCode,
    pub signature: String,
    pub token: String,
    pub expires_at: Timestamp,
    /// Time the vote was recorded; needed to verify the signature later.
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedResponse {
    pub success: bool,
    pub has_voted: bool,
}

impl From<bool> for HasVotedResponse {
    fn from(has_voted: bool) -> Self {
        Self {
            success: true,
            has_voted,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyResponse {
    pub success: bool,
    pub candidates: Vec<TallyEntry>,
    pub total_votes: u64,
}

impl TallyResponse {
    pub fn vote_count(&self, id: CandidateId) -> Option<u64> {
        self.candidates
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.vote_count)
    }
}

impl From<&Election> for TallyResponse {
    fn from(election: &Election) -> Self {
        Self {
            success: true,
            candidates: election
                .candidates
                .iter()
                .map(|c| TallyEntry {
                    id: c.id,
                    name: c.name.clone(),
                    vote_count: c.vote_count,
                })
                .collect(),
            total_votes: election.total_votes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptBody {
    pub receipt_code: ReceiptCode,
    pub voter_handle: VoterHandle,
    pub candidate_id: CandidateId,
    pub timestamp: Timestamp,
    pub transaction_ref: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub success: bool,
    pub receipt: ReceiptBody,
}

impl From<Receipt> for ReceiptResponse {
    fn from(r: Receipt) -> Self {
        Self {
            success: true,
            receipt: ReceiptBody {
                receipt_code: r.receipt_code,
                voter_handle: r.voter_handle,
                candidate_id: r.candidate_id,
                timestamp: r.timestamp,
                transaction_ref: r.transaction_ref,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyVoteResponse {
    pub success: bool,
    pub verified: bool,
}

impl From<bool> for VerifyVoteResponse {
    fn from(verified: bool) -> Self {
        Self {
            success: true,
            verified,
        }
    }
}

/// Tagged failure: `error` is the stable code, `message` is safe to show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    pub retryable: bool,
}

impl From<&VoteError> for ErrorResponse {
    fn from(e: &VoteError) -> Self {
        let reasons = match e {
            VoteError::ValidationError { reasons } => reasons.clone(),
            _ => Vec::new(),
        };
        Self {
            success: false,
            error: e.code().to_string(),
            message: e.public_message(),
            reasons,
            retryable: e.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballotguard_types::{Candidate, ElectionId};
    use serde_json::json;

    #[test]
    fn tally_uses_camel_case() {
        let mut election = Election::new(
            ElectionId::new("e"),
            vec![Candidate::new(1, "Ada", None), Candidate::new(2, "Grace", None)],
        )
        .unwrap();
        election.record_vote(CandidateId::new(2));

        let value = serde_json::to_value(TallyResponse::from(&election)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "candidates": [
                    {"id": 1, "name": "Ada", "voteCount": 0},
                    {"id": 2, "name": "Grace", "voteCount": 1}
                ],
                "totalVotes": 1
            })
        );
    }

    #[test]
    fn abuse_errors_do_not_leak_kind_in_message() {
        let body = ErrorResponse::from(&VoteError::Suspicious);
        assert!(!body.success);
        assert_eq!(body.error, "SUSPICIOUS");
        assert_eq!(body.message, crate::error::TRY_AGAIN_LATER);
        assert!(!body.retryable);
    }

    #[test]
    fn validation_error_carries_reasons() {
        let body = ErrorResponse::from(&VoteError::ValidationError {
            reasons: vec!["test number".into()],
        });
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["reasons"], json!(["test number"]));
        assert_eq!(value["error"], "VALIDATION_ERROR");
    }

    #[test]
    fn register_response_omits_missing_handle() {
        let body = RegisterResponse {
            success: false,
            message: "x".into(),
            voter_handle: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("voterHandle").is_none());
    }
}
