//! Nullable store: in-memory ledger with injectable faults.

use ballotguard_store::{LedgerStore, MemoryStore, StoreError, WriteBatch};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An in-memory ledger for tests that can simulate an unreachable backend
/// and concurrent writers from other processes.
#[derive(Default)]
pub struct NullStore {
    inner: MemoryStore,
    unavailable: AtomicBool,
    /// Commits to reject with a conflict before letting one through.
    pending_conflicts: AtomicUsize,
    commits: AtomicUsize,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Timeout`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail the next `n` commits with a conflict, as if another writer
    /// got there first.
    pub fn inject_conflicts(&self, n: usize) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }

    /// Number of successful commits.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.inner.keys_with_prefix(prefix)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout("null store is unavailable".into()));
        }
        Ok(())
    }
}

impl LedgerStore for NullStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_available()?;
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner.put(key, value)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.check_available()?;
        let injected = self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            let key = batch
                .preconditions()
                .first()
                .map(|p| p.key().to_string())
                .unwrap_or_default();
            return Err(StoreError::Conflict(key));
        }
        self.inner.commit(batch)?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_store_times_out() {
        let store = NullStore::new();
        store.put("k", b"v").unwrap();
        store.set_unavailable(true);
        assert!(matches!(store.get("k"), Err(StoreError::Timeout(_))));
        store.set_unavailable(false);
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn injected_conflicts_are_consumed() {
        let store = NullStore::new();
        store.inject_conflicts(2);
        let batch = || WriteBatch::new().expect_absent("k").put("k", b"v".to_vec());
        assert_eq!(store.commit(batch()), Err(StoreError::Conflict("k".into())));
        assert_eq!(store.commit(batch()), Err(StoreError::Conflict("k".into())));
        store.commit(batch()).unwrap();
        assert_eq!(store.commits(), 1);
    }
}
