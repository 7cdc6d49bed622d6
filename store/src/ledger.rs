//! The ledger store contract.

use crate::StoreError;

/// A condition that must hold for a [`WriteBatch`] to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Precondition {
    /// The key must not exist.
    Absent(String),
    /// The key must currently hold exactly these bytes.
    Equals(String, Vec<u8>),
}

impl Precondition {
    pub fn key(&self) -> &str {
        match self {
            Self::Absent(k) | Self::Equals(k, _) => k,
        }
    }

    /// Whether the condition holds for the key's current value.
    pub fn holds(&self, current: Option<&[u8]>) -> bool {
        match self {
            Self::Absent(_) => current.is_none(),
            Self::Equals(_, expected) => current == Some(expected.as_slice()),
        }
    }
}

/// A group of puts applied atomically, only if every precondition holds.
///
/// Dropping a batch without committing it writes nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    preconditions: Vec<Precondition>,
    puts: Vec<(String, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to be absent at commit time.
    pub fn expect_absent(mut self, key: impl Into<String>) -> Self {
        self.preconditions.push(Precondition::Absent(key.into()));
        self
    }

    /// Require `key` to hold `value` at commit time.
    pub fn expect_value(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.preconditions.push(Precondition::Equals(key.into(), value));
        self
    }

    pub fn put(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.puts.push((key.into(), value));
        self
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn puts(&self) -> &[(String, Vec<u8>)] {
        &self.puts
    }

    pub fn into_puts(self) -> Vec<(String, Vec<u8>)> {
        self.puts
    }
}

/// Key-value ledger.
///
/// `get` and `put` are linearizable per key. `commit` checks every
/// precondition and applies every put as one step, or fails with
/// [`StoreError::Conflict`] naming the first failed key and writes nothing.
/// Remote backends should bound each call with a timeout and report it as
/// [`StoreError::Timeout`].
pub trait LedgerStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Single-key compare-and-swap. Returns `false` if `expected` did not
    /// match the current value.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, StoreError> {
        let batch = match expected {
            Some(bytes) => WriteBatch::new().expect_value(key, bytes.to_vec()),
            None => WriteBatch::new().expect_absent(key),
        };
        match self.commit(batch.put(key, new.to_vec())) {
            Ok(()) => Ok(true),
            Err(StoreError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).commit(batch)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, StoreError> {
        (**self).compare_and_swap(key, expected, new)
    }
}
