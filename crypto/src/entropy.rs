//! Randomness for salts, receipt codes and generated keys.

use crate::CryptoError;
use ballotguard_types::{ReceiptCode, Salt, SALT_LEN};

/// A source of cryptographically secure random bytes.
pub trait Entropy: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError>;

    fn salt(&self) -> Result<Salt, CryptoError> {
        let mut bytes = [0u8; SALT_LEN];
        self.fill(&mut bytes)?;
        Ok(Salt::new(bytes))
    }

    fn receipt_code(&self) -> Result<ReceiptCode, CryptoError> {
        let mut bytes = [0u8; 8];
        self.fill(&mut bytes)?;
        Ok(ReceiptCode::from_bytes(bytes))
    }
}

/// Operating-system randomness via `getrandom`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        getrandom::getrandom(buf).map_err(|e| CryptoError::Entropy(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_salts_differ() {
        let a = OsEntropy.salt().unwrap();
        let b = OsEntropy.salt().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn os_receipt_codes_are_well_formed() {
        let code = OsEntropy.receipt_code().unwrap();
        assert!(ReceiptCode::parse(code.as_str()).is_ok());
    }
}
