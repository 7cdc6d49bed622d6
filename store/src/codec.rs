//! Record (de)serialization with bincode.

use crate::{LedgerStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode stored bytes. Undecodable bytes under a known key mean the
/// ledger is corrupted, not that the caller sent bad input.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corruption(format!("{key}: {e}")))
}

/// Fetch and decode a record, returning the raw bytes alongside it so the
/// caller can use them as a commit precondition.
pub fn get_record<T, S>(store: &S, key: &str) -> Result<Option<(T, Vec<u8>)>, StoreError>
where
    T: DeserializeOwned,
    S: LedgerStore + ?Sized,
{
    match store.get(key)? {
        Some(bytes) => Ok(Some((decode(key, &bytes)?, bytes))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use ballotguard_types::{Timestamp, VoterHandle, VoterRecord};

    #[test]
    fn get_record_returns_value_and_bytes() {
        let store = MemoryStore::new();
        let rec = VoterRecord::registered(VoterHandle::from_digest([1; 32]), Timestamp::new(3));
        let bytes = encode(&rec).unwrap();
        store.put("voter/x", &bytes).unwrap();

        let (decoded, raw) = get_record::<VoterRecord, _>(&store, "voter/x").unwrap().unwrap();
        assert_eq!(decoded, rec);
        assert_eq!(raw, bytes);
        assert!(get_record::<VoterRecord, _>(&store, "voter/y").unwrap().is_none());
    }

    #[test]
    fn garbage_is_corruption() {
        let store = MemoryStore::new();
        store.put("voter/x", &[0xff]).unwrap();
        let err = get_record::<VoterRecord, _>(&store, "voter/x").unwrap_err();
        assert!(matches!(err, StoreError::Corruption(_)));
    }
}
