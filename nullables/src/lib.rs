//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of the vote orchestrator (clock, entropy,
//! ledger store) sit behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (advance time, script random bytes,
//!   inject store outages and write conflicts)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod random;
pub mod store;

pub use clock::NullClock;
pub use random::NullRandom;
pub use store::NullStore;
