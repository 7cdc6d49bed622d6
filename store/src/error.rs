use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A batch precondition did not hold; nothing was written.
    #[error("write conflict on key: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage operation timed out: {0}")]
    Timeout(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}
