//! Election and candidate records.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of an election.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElectionId(String);

impl ElectionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElectionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a candidate within an election.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(u32);

impl CandidateId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CandidateId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A candidate on the ballot. Only `vote_count` ever changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub party: Option<String>,
    pub vote_count: u64,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>, name: impl Into<String>, party: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            party,
            vote_count: 0,
        }
    }
}

/// An election and its running tally.
///
/// Invariant: `total_votes` equals the sum of every candidate's `vote_count`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub candidates: Vec<Candidate>,
    pub total_votes: u64,
    pub active: bool,
}

impl Election {
    /// Create an active election with zeroed counts.
    pub fn new(id: ElectionId, candidates: Vec<Candidate>) -> Result<Self, TypesError> {
        let mut seen = HashSet::new();
        for c in &candidates {
            if !seen.insert(c.id) {
                return Err(TypesError::DuplicateCandidate(c.id.get()));
            }
        }
        let candidates = candidates
            .into_iter()
            .map(|c| Candidate { vote_count: 0, ..c })
            .collect();
        Ok(Self {
            id,
            candidates,
            total_votes: 0,
            active: true,
        })
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Count one vote for `id`. Returns `false` (and changes nothing) if the
    /// candidate does not exist.
    pub fn record_vote(&mut self, id: CandidateId) -> bool {
        match self.candidates.iter_mut().find(|c| c.id == id) {
            Some(candidate) => {
                candidate.vote_count += 1;
                self.total_votes += 1;
                true
            }
            None => false,
        }
    }

    /// Whether the conservation invariant holds.
    pub fn is_conserved(&self) -> bool {
        self.candidates.iter().map(|c| c.vote_count).sum::<u64>() == self.total_votes
    }
}
