//! Abstract ledger storage for BallotGuard.
//!
//! The ledger is a key-value store with per-key linearizable `get`/`put`
//! plus an all-or-nothing [`WriteBatch`] commit guarded by preconditions.
//! The orchestrator builds its cross-key atomicity on that one primitive,
//! so the same logic runs against [`MemoryStore`] in-process and against a
//! durable or replicated backend in production.

pub mod codec;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod memory;

pub use codec::{decode, encode, get_record};
pub use error::StoreError;
pub use ledger::{LedgerStore, Precondition, WriteBatch};
pub use memory::MemoryStore;
