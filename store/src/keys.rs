//! Key layout of the ledger keyspace.

use ballotguard_types::{ElectionId, ReceiptCode, VoterHandle};

pub const ELECTION_PREFIX: &str = "election/";
pub const VOTER_PREFIX: &str = "voter/";
pub const LOCATOR_PREFIX: &str = "locator/";
pub const RECEIPT_PREFIX: &str = "receipt/";
pub const TOKEN_PREFIX: &str = "token/";

pub fn election(id: &ElectionId) -> String {
    format!("{ELECTION_PREFIX}{id}")
}

pub fn voter(handle: &VoterHandle) -> String {
    format!("{VOTER_PREFIX}{handle}")
}

/// `locator` is the hex keyed hash of an identity number.
pub fn locator(locator: &str) -> String {
    format!("{LOCATOR_PREFIX}{locator}")
}

pub fn receipt(code: &ReceiptCode) -> String {
    format!("{RECEIPT_PREFIX}{code}")
}

/// `token` is the hex token tag.
pub fn token(token: &str) -> String {
    format!("{TOKEN_PREFIX}{token}")
}
