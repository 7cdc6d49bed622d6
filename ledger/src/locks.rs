//! Keyed in-process locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Entries kept before idle locks are pruned.
const PRUNE_THRESHOLD: usize = 1024;

/// A table of mutexes keyed by string.
///
/// Callers take the `Arc<Mutex<()>>` for a key and hold its guard across
/// a read-modify-commit sequence. Locks nobody holds are pruned once the
/// table grows past a threshold.
#[derive(Default)]
pub struct LockTable {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `key`, created on first use.
    pub fn get(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.len() >= PRUNE_THRESHOLD && !locks.contains_key(key) {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Arc::clone(locks.entry(key.to_string()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_lock() {
        let table = LockTable::new();
        let a = table.get("k");
        let b = table.get("k");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &table.get("other")));
    }

    #[test]
    fn idle_locks_are_pruned() {
        let table = LockTable::new();
        let held = table.get("held");
        for i in 0..PRUNE_THRESHOLD {
            table.get(&format!("k{i}"));
        }
        table.get("fresh");
        // Only the held lock and the newly inserted one survive the prune.
        assert_eq!(table.locks.lock().unwrap().len(), 2);
        assert!(Arc::ptr_eq(&held, &table.get("held")));
    }
}
