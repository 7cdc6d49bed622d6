//! Per-voter lifecycle state.

use serde::{Deserialize, Serialize};

/// Where a voter handle sits in the `Unregistered → Registered → Voted` machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoterState {
    /// No record exists for the handle.
    Unregistered,
    /// Registered and eligible to cast one vote.
    Registered,
    /// Terminal: the vote has been counted.
    Voted,
}

impl VoterState {
    /// Whether a vote may still be cast from this state.
    pub fn can_vote(&self) -> bool {
        matches!(self, Self::Registered)
    }
}
