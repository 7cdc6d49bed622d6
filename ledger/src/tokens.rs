//! Single-use, time-boxed security tokens.

use crate::VoteError;
use ballotguard_crypto::VoteSigner;
use ballotguard_store::{encode, get_record, keys, LedgerStore, StoreError, WriteBatch};
use ballotguard_types::{SecurityToken, Timestamp, VoterHandle};

/// Issues tokens bound to a voter handle and consumes them exactly once.
///
/// A token is the hex HMAC of `handle:expiresAt`. Its record lives under
/// `token/<tag>` and is flipped to `used` by a compare-and-swap, so of any
/// number of concurrent verifications at most one observes the unused
/// record and wins.
#[derive(Clone, Debug)]
pub struct TokenRegistry {
    signer: VoteSigner,
    max_attempts: u32,
}

impl TokenRegistry {
    pub fn new(signer: VoteSigner, max_attempts: u32) -> Self {
        Self {
            signer,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Mint an unused token for `handle`, valid until `now + ttl_minutes`.
    ///
    /// The token is not stored; add it to a batch with [`Self::stage`].
    pub fn issue(
        &self,
        handle: &VoterHandle,
        ttl_minutes: u64,
        now: Timestamp,
    ) -> Result<SecurityToken, VoteError> {
        let expires_at = now.plus_minutes(ttl_minutes);
        let tag = self.signer.token_tag(handle.as_str(), expires_at)?;
        Ok(SecurityToken::issued(tag, expires_at, handle.clone()))
    }

    /// Add the creation of `token` to `batch`.
    pub fn stage(batch: WriteBatch, token: &SecurityToken) -> Result<WriteBatch, StoreError> {
        let key = keys::token(&token.token);
        Ok(batch.expect_absent(key.clone()).put(key, encode(token)?))
    }

    /// Check `token` against its stored record and mark it used.
    ///
    /// Checks run in order: expiry of the presented time, existence,
    /// stored expiry, prior use, then the tag and binding. A `bound` of
    /// `None` (an identity with no handle) fails the binding check.
    pub fn verify<S: LedgerStore + ?Sized>(
        &self,
        store: &S,
        token: &str,
        bound: Option<&VoterHandle>,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<(), VoteError> {
        if now > expires_at {
            return Err(VoteError::TokenExpired);
        }
        let key = keys::token(token);

        for _ in 0..self.max_attempts {
            let Some((record, bytes)) = get_record::<SecurityToken, _>(store, &key)? else {
                return Err(VoteError::TokenMismatch);
            };
            if record.is_expired(now) {
                return Err(VoteError::TokenExpired);
            }
            if record.used {
                return Err(VoteError::TokenAlreadyUsed);
            }
            let genuine = self
                .signer
                .verify_token_tag(token, record.bound_voter_handle.as_str(), record.expires_at);
            let bound = match bound {
                Some(handle) if genuine && *handle == record.bound_voter_handle => handle,
                _ => return Err(VoteError::TokenMismatch),
            };
            if record.expires_at != expires_at {
                return Err(VoteError::TokenMismatch);
            }

            if store.compare_and_swap(&key, Some(&bytes), &encode(&record.consumed())?)? {
                tracing::info!(voter = bound.short(), "security token consumed");
                return Ok(());
            }
            tracing::debug!(voter = bound.short(), "token record changed during verification, re-reading");
        }

        Err(VoteError::Unavailable(
            "token verification did not settle".to_string(),
        ))
    }
}
