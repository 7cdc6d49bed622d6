//! Cryptographic primitives for BallotGuard.
//!
//! - **SHA-256** for voter handles and receipt transaction references
//! - **Salted anonymization**: `handle = SHA-256(salt ‖ identityNumber)` with a
//!   fresh random salt per derivation
//! - **HMAC-SHA256** for vote-fact signatures, security-token tags and the
//!   keyed voter locator
//! - A pluggable [`Entropy`] source so tests can script salts and receipt codes

pub mod anonymizer;
pub mod entropy;
pub mod error;
pub mod hash;
pub mod sign;

pub use anonymizer::Anonymizer;
pub use entropy::{Entropy, OsEntropy};
pub use error::CryptoError;
pub use hash::{sha256, sha256_multi, transaction_ref};
pub use sign::{SigningSecret, VoteSigner};
