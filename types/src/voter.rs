//! Voter records and the locator index entry.

use crate::{CandidateId, ReceiptCode, Salt, Timestamp, VoterHandle, VoterState};
use serde::{Deserialize, Serialize};

/// Ledger record for a registered voter, keyed by handle.
///
/// `has_voted`, `voted_at`, `candidate_id` and `receipt_code` are written
/// exactly once, by the cast-vote transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub handle: VoterHandle,
    pub registered: bool,
    pub has_voted: bool,
    pub registered_at: Timestamp,
    pub voted_at: Option<Timestamp>,
    pub candidate_id: Option<CandidateId>,
    pub receipt_code: Option<ReceiptCode>,
}

impl VoterRecord {
    pub fn registered(handle: VoterHandle, at: Timestamp) -> Self {
        Self {
            handle,
            registered: true,
            has_voted: false,
            registered_at: at,
            voted_at: None,
            candidate_id: None,
            receipt_code: None,
        }
    }

    pub fn state(&self) -> VoterState {
        if self.has_voted {
            VoterState::Voted
        } else if self.registered {
            VoterState::Registered
        } else {
            VoterState::Unregistered
        }
    }

    /// Copy of this record in the `Voted` state.
    pub fn with_vote(&self, candidate: CandidateId, at: Timestamp, receipt: ReceiptCode) -> Self {
        Self {
            has_voted: true,
            voted_at: Some(at),
            candidate_id: Some(candidate),
            receipt_code: Some(receipt),
            ..self.clone()
        }
    }
}

/// Index entry that lets a caller holding the raw identity number find the
/// handle and salt it was registered under. Keyed by a keyed hash of the
/// identity number, never by the number itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterLocator {
    pub handle: VoterHandle,
    pub salt: Salt,
}
