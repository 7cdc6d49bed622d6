use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}
