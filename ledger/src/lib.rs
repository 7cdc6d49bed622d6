//! The vote-integrity state machine.
//!
//! [`VoteOrchestrator`] ties the pieces together:
//! detect abuse → validate → locate handle → check not already voted →
//! mutate tally → issue receipt → sign.
//!
//! Per voter handle the states are `Unregistered → Registered → Voted`
//! (terminal). Every mutation of a voter, an election tally or a token is
//! a single precondition-guarded ledger commit, so no partial state is ever
//! observable and concurrent writers from other processes are detected.

pub mod config;
pub mod error;
pub mod locks;
pub mod orchestrator;
pub mod responses;
pub mod tokens;

pub use config::{ConfigError, EngineConfig};
pub use error::VoteError;
pub use locks::LockTable;
pub use orchestrator::{RegisterOutcome, VoteOrchestrator};
pub use responses::{
    CastVoteResponse, ErrorResponse, HasVotedResponse, ReceiptBody, ReceiptResponse,
    RegisterResponse, TallyEntry, TallyResponse, VerifyVoteResponse,
};
pub use tokens::TokenRegistry;
