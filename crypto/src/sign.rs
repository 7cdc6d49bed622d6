//! HMAC-SHA256 signing of vote facts, token tags and voter locators.
//!
//! All MACs are keyed by one process-wide [`SigningSecret`]. Inputs are
//! domain separated by construction:
//! - vote fact: `voterHandle:candidateId:timestamp`
//! - token: `boundData:expiresAt`
//! - locator: `locator:identityNumber`

use crate::CryptoError;
use ballotguard_types::{CandidateId, Timestamp, VoterHandle};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted key length in bytes.
const MIN_SECRET_LEN: usize = 16;

/// The process-wide HMAC key. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_SECRET_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Parse a hex-encoded secret.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim()).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Self::new(bytes)
    }

    /// Generate a fresh 32-byte secret.
    pub fn generate(entropy: &dyn crate::Entropy) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; 32];
        entropy.fill(&mut bytes)?;
        Self::new(bytes)
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningSecret(<{} bytes>)", self.0.len())
    }
}

/// Produces and checks HMAC tags under the process-wide secret.
#[derive(Clone, Debug)]
pub struct VoteSigner {
    secret: SigningSecret,
}

impl VoteSigner {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, CryptoError> {
        HmacSha256::new_from_slice(&self.secret.0).map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    fn tag(&self, message: &str) -> Result<String, CryptoError> {
        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of a hex tag against `message`.
    fn check(&self, tag_hex: &str, message: &str) -> bool {
        let Ok(tag) = hex::decode(tag_hex) else {
            return false;
        };
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(message.as_bytes());
        mac.verify_slice(&tag).is_ok()
    }

    fn vote_fact(candidate: CandidateId, handle: &VoterHandle, timestamp: Timestamp) -> String {
        format!("{}:{}:{}", handle, candidate, timestamp)
    }

    /// Sign the fact that `handle` voted for `candidate` at `timestamp`.
    pub fn sign_vote_fact(
        &self,
        candidate: CandidateId,
        handle: &VoterHandle,
        timestamp: Timestamp,
    ) -> Result<String, CryptoError> {
        self.tag(&Self::vote_fact(candidate, handle, timestamp))
    }

    pub fn verify_vote_fact(
        &self,
        signature: &str,
        candidate: CandidateId,
        handle: &VoterHandle,
        timestamp: Timestamp,
    ) -> bool {
        self.check(signature, &Self::vote_fact(candidate, handle, timestamp))
    }

    /// Tag binding `bound` to an expiry time.
    pub fn token_tag(&self, bound: &str, expires_at: Timestamp) -> Result<String, CryptoError> {
        self.tag(&format!("{}:{}", bound, expires_at))
    }

    pub fn verify_token_tag(&self, token: &str, bound: &str, expires_at: Timestamp) -> bool {
        self.check(token, &format!("{}:{}", bound, expires_at))
    }

    /// Keyed, deterministic lookup key for an identity number.
    pub fn locator(&self, identity: &str) -> Result<String, CryptoError> {
        self.tag(&format!("locator:{}", identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(byte: u8) -> VoteSigner {
        VoteSigner::new(SigningSecret::new(vec![byte; 32]).unwrap())
    }

    fn handle() -> VoterHandle {
        VoterHandle::from_digest([9; 32])
    }

    #[test]
    fn sign_and_verify_vote_fact() {
        let s = signer(1);
        let sig = s
            .sign_vote_fact(CandidateId::new(2), &handle(), Timestamp::new(1_700))
            .unwrap();
        assert_eq!(sig.len(), 64);
        assert!(s.verify_vote_fact(&sig, CandidateId::new(2), &handle(), Timestamp::new(1_700)));
    }

    #[test]
    fn altered_fields_fail_verification() {
        let s = signer(1);
        let sig = s
            .sign_vote_fact(CandidateId::new(2), &handle(), Timestamp::new(1_700))
            .unwrap();
        assert!(!s.verify_vote_fact(&sig, CandidateId::new(3), &handle(), Timestamp::new(1_700)));
        assert!(!s.verify_vote_fact(&sig, CandidateId::new(2), &handle(), Timestamp::new(1_701)));
        assert!(!s.verify_vote_fact(
            &sig,
            CandidateId::new(2),
            &VoterHandle::from_digest([8; 32]),
            Timestamp::new(1_700)
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let sig = signer(1)
            .sign_vote_fact(CandidateId::new(2), &handle(), Timestamp::new(5))
            .unwrap();
        assert!(!signer(2).verify_vote_fact(&sig, CandidateId::new(2), &handle(), Timestamp::new(5)));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        let s = signer(1);
        assert!(!s.verify_vote_fact("not-hex", CandidateId::new(2), &handle(), Timestamp::new(5)));
        assert!(!s.verify_vote_fact("abcd", CandidateId::new(2), &handle(), Timestamp::new(5)));
    }

    #[test]
    fn token_tag_binds_expiry() {
        let s = signer(1);
        let tag = s.token_tag("bound", Timestamp::new(100)).unwrap();
        assert!(s.verify_token_tag(&tag, "bound", Timestamp::new(100)));
        assert!(!s.verify_token_tag(&tag, "bound", Timestamp::new(101)));
        assert!(!s.verify_token_tag(&tag, "other", Timestamp::new(100)));
    }

    #[test]
    fn locator_is_deterministic_and_keyed() {
        assert_eq!(
            signer(1).locator("497318520641").unwrap(),
            signer(1).locator("497318520641").unwrap()
        );
        assert_ne!(
            signer(1).locator("497318520641").unwrap(),
            signer(2).locator("497318520641").unwrap()
        );
    }

    #[test]
    fn short_secret_rejected() {
        assert!(SigningSecret::new(vec![1; 8]).is_err());
        assert!(SigningSecret::from_hex("zz").is_err());
        assert!(SigningSecret::from_hex(&"ab".repeat(32)).is_ok());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let secret = SigningSecret::new(vec![0x41; 32]).unwrap();
        assert_eq!(format!("{secret:?}"), "SigningSecret(<32 bytes>)");
    }
}
