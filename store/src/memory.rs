//! In-memory ledger backend.

use crate::{LedgerStore, StoreError, WriteBatch};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A thread-safe in-memory ledger.
///
/// One mutex guards the whole map, so a commit's precondition checks and
/// puts form a single step.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    pub fn len(&self) -> usize {
        self.entries().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .entries()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        if let Some(failed) = batch
            .preconditions()
            .iter()
            .find(|p| !p.holds(entries.get(p.key()).map(Vec::as_slice)))
        {
            return Err(StoreError::Conflict(failed.key().to_string()));
        }
        for (key, value) in batch.into_puts() {
            entries.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn put_get() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.put("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn failed_precondition_writes_nothing() {
        let store = MemoryStore::new();
        store.put("a", b"1").unwrap();
        let batch = WriteBatch::new()
            .expect_value("a", b"0".to_vec())
            .put("a", b"2".to_vec())
            .put("b", b"2".to_vec());
        assert_eq!(store.commit(batch), Err(StoreError::Conflict("a".into())));
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn batch_applies_all_puts() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .expect_absent("a")
            .put("a", b"1".to_vec())
            .put("b", b"2".to_vec());
        store.commit(batch).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys_with_prefix("").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn compare_and_swap_has_one_winner() {
        let store = Arc::new(MemoryStore::new());
        store.put("flag", b"unused").unwrap();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .compare_and_swap("flag", Some(b"unused"), b"used")
                        .unwrap()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.get("flag").unwrap(), Some(b"used".to_vec()));
    }

    #[test]
    fn compare_and_swap_absent() {
        let store = MemoryStore::new();
        assert!(store.compare_and_swap("k", None, b"v").unwrap());
        assert!(!store.compare_and_swap("k", None, b"w").unwrap());
    }
}
