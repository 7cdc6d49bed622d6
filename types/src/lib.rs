//! Fundamental types for the BallotGuard vote-integrity engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! timestamps and clocks, voter handles and salts, and the ledger records
//! (elections, candidates, voters, receipts, security tokens).

pub mod election;
pub mod error;
pub mod handle;
pub mod receipt;
pub mod state;
pub mod time;
pub mod token;
pub mod voter;

pub use election::{Candidate, CandidateId, Election, ElectionId};
pub use error::TypesError;
pub use handle::{Salt, VoterHandle, SALT_LEN};
pub use receipt::{Receipt, ReceiptCode};
pub use state::VoterState;
pub use time::{Clock, SystemClock, Timestamp};
pub use token::SecurityToken;
pub use voter::{VoterLocator, VoterRecord};
