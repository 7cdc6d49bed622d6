//! SHA-256 hashing.

use ballotguard_types::{CandidateId, ReceiptCode, Timestamp, VoterHandle};
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Reference recorded on a receipt: hex SHA-256 of
/// `receiptCode:voterHandle:candidateId:timestamp`.
pub fn transaction_ref(
    code: &ReceiptCode,
    handle: &VoterHandle,
    candidate: CandidateId,
    timestamp: Timestamp,
) -> String {
    let preimage = format!("{}:{}:{}:{}", code, handle, candidate, timestamp);
    hex::encode(sha256(preimage.as_bytes()))
}
