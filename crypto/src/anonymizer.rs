//! Salted one-way derivation of voter handles.
//!
//! `handle = SHA-256(salt ‖ identityNumber)`, with a fresh random salt per
//! derivation. The salt must be stored next to anything keyed by the handle;
//! with it, a caller who already holds the raw number can confirm the
//! mapping, but nothing can enumerate numbers from handles.

use crate::entropy::Entropy;
use crate::hash::sha256_multi;
use crate::CryptoError;
use ballotguard_types::{Salt, VoterHandle};
use std::sync::Arc;

pub struct Anonymizer {
    entropy: Arc<dyn Entropy>,
}

impl Anonymizer {
    pub fn new(entropy: Arc<dyn Entropy>) -> Self {
        Self { entropy }
    }

    /// Derive a new `(handle, salt)` pair for `identity`.
    pub fn derive(&self, identity: &str) -> Result<(VoterHandle, Salt), CryptoError> {
        let salt = self.entropy.salt()?;
        Ok((Self::handle_with_salt(identity, &salt), salt))
    }

    /// Recompute the handle for a known salt.
    pub fn handle_with_salt(identity: &str, salt: &Salt) -> VoterHandle {
        VoterHandle::from_digest(sha256_multi(&[salt.as_bytes(), identity.as_bytes()]))
    }

    /// Whether `handle` was derived from `identity` with `salt`.
    pub fn verify(identity: &str, salt: &Salt, handle: &VoterHandle) -> bool {
        Self::handle_with_salt(identity, salt) == *handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OsEntropy;

    fn anonymizer() -> Anonymizer {
        Anonymizer::new(Arc::new(OsEntropy))
    }

    #[test]
    fn derive_then_verify() {
        let (handle, salt) = anonymizer().derive("497318520641").unwrap();
        assert!(Anonymizer::verify("497318520641", &salt, &handle));
    }

    #[test]
    fn different_identity_does_not_verify() {
        let (handle, salt) = anonymizer().derive("497318520641").unwrap();
        assert!(!Anonymizer::verify("918273645025", &salt, &handle));
    }

    #[test]
    fn same_identity_gets_distinct_handles() {
        let a = anonymizer();
        let (h1, s1) = a.derive("497318520641").unwrap();
        let (h2, s2) = a.derive("497318520641").unwrap();
        assert_ne!(s1, s2);
        assert_ne!(h1, h2);
    }

    #[test]
    fn handle_with_salt_is_deterministic() {
        let salt = Salt::new([7; 16]);
        assert_eq!(
            Anonymizer::handle_with_salt("497318520641", &salt),
            Anonymizer::handle_with_salt("497318520641", &salt)
        );
    }

    #[test]
    fn handle_does_not_contain_identity() {
        let (handle, _) = anonymizer().derive("497318520641").unwrap();
        assert!(!handle.as_str().contains("497318520641"));
    }
}
