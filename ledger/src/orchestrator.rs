//! The vote orchestrator: validation, abuse detection, anonymization and
//! signing wired to the ledger as the register / cast / verify workflow.

use crate::config::EngineConfig;
use crate::error::VoteError;
use crate::locks::LockTable;
use crate::responses::{CastVoteResponse, RegisterResponse, TallyResponse};
use crate::tokens::TokenRegistry;
use ballotguard_abuse::{AbuseDetector, Verdict};
use ballotguard_crypto::{transaction_ref, Anonymizer, Entropy, OsEntropy, SigningSecret, VoteSigner};
use ballotguard_identity::{validate, Validation};
use ballotguard_store::{encode, get_record, keys, LedgerStore, StoreError, WriteBatch};
use ballotguard_types::{
    Candidate, CandidateId, Clock, Election, ElectionId, Receipt, ReceiptCode, SystemClock,
    Timestamp, VoterHandle, VoterLocator, VoterRecord,
};
use std::sync::{Arc, PoisonError};

/// Result of a successful registration.
///
/// Registering an identity twice is an expected case, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered { handle: VoterHandle },
    AlreadyRegistered { handle: VoterHandle },
}

impl RegisterOutcome {
    pub fn handle(&self) -> &VoterHandle {
        match self {
            Self::Registered { handle } | Self::AlreadyRegistered { handle } => handle,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    pub fn into_response(self) -> RegisterResponse {
        let message = match &self {
            Self::Registered { .. } => "voter registered",
            Self::AlreadyRegistered { .. } => "voter already registered",
        };
        RegisterResponse {
            success: true,
            message: message.to_string(),
            voter_handle: Some(self.handle().clone()),
        }
    }
}

/// The vote-integrity state machine over a shared ledger.
///
/// Voter handles move `Unregistered → Registered → Voted`. Every mutation
/// is one precondition-guarded [`WriteBatch`]: a vote updates the election
/// tally, the voter record, the receipt and the token together or not at
/// all. In-process writers are serialized by an election-wide lock (casting)
/// and per-identity locks (registration); the preconditions catch writers
/// in other processes, and conflicting commits are retried.
pub struct VoteOrchestrator<S: LedgerStore> {
    store: S,
    clock: Arc<dyn Clock>,
    entropy: Arc<dyn Entropy>,
    anonymizer: Anonymizer,
    signer: VoteSigner,
    tokens: TokenRegistry,
    abuse: AbuseDetector,
    config: EngineConfig,
    election_id: ElectionId,
    election_locks: LockTable,
    locator_locks: LockTable,
}

impl<S: LedgerStore> VoteOrchestrator<S> {
    pub fn new(store: S, secret: SigningSecret, config: EngineConfig) -> Self {
        let entropy: Arc<dyn Entropy> = Arc::new(OsEntropy);
        let signer = VoteSigner::new(secret);
        Self {
            store,
            clock: Arc::new(SystemClock),
            anonymizer: Anonymizer::new(Arc::clone(&entropy)),
            entropy,
            tokens: TokenRegistry::new(signer.clone(), config.commit_retries),
            signer,
            abuse: AbuseDetector::new(config.abuse_config()),
            election_id: config.election_id(),
            config,
            election_locks: LockTable::new(),
            locator_locks: LockTable::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the randomness used for salts and receipt codes.
    pub fn with_entropy(mut self, entropy: Arc<dyn Entropy>) -> Self {
        self.anonymizer = Anonymizer::new(Arc::clone(&entropy));
        self.entropy = entropy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn election_id(&self) -> &ElectionId {
        &self.election_id
    }

    pub fn abuse(&self) -> &AbuseDetector {
        &self.abuse
    }

    // ── Voter operations ───────────────────────────────────────────────

    /// Register `identity` as a voter, creating its handle on first use.
    pub fn register(&self, identity: &str, source: &str) -> Result<RegisterOutcome, VoteError> {
        let now = self.clock.now();
        self.admit(source, now)?;
        self.validated(identity, source, now)?;

        let locator = self.signer.locator(identity)?;
        let locator_key = keys::locator(&locator);
        let lock = self.locator_locks.get(&locator);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        for attempt in 1..=self.attempts() {
            if let Some(handle) = self.read_locator(identity, &locator_key)? {
                tracing::debug!(voter = handle.short(), "voter already registered");
                return Ok(RegisterOutcome::AlreadyRegistered { handle });
            }

            let (handle, salt) = self.anonymizer.derive(identity)?;
            let voter_key = keys::voter(&handle);
            let entry = VoterLocator {
                handle: handle.clone(),
                salt,
            };
            let batch = WriteBatch::new()
                .expect_absent(locator_key.clone())
                .expect_absent(voter_key.clone())
                .put(locator_key.clone(), encode(&entry)?)
                .put(voter_key, encode(&VoterRecord::registered(handle.clone(), now))?);

            match self.store.commit(batch) {
                Ok(()) => {
                    tracing::info!(voter = handle.short(), "voter registered");
                    return Ok(RegisterOutcome::Registered { handle });
                }
                Err(StoreError::Conflict(_)) => {
                    tracing::debug!(attempt, "registration commit conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.exhausted("registration"))
    }

    /// Cast `identity`'s one vote for `candidate` in the configured election.
    pub fn cast_vote(
        &self,
        identity: &str,
        candidate: CandidateId,
        source: &str,
    ) -> Result<CastVoteResponse, VoteError> {
        let now = self.clock.now();
        self.admit(source, now)?;
        self.validated(identity, source, now)?;
        let handle = self.locate(identity)?.ok_or(VoteError::NotRegistered)?;

        let election_key = keys::election(&self.election_id);
        let voter_key = keys::voter(&handle);
        let lock = self.election_locks.get(self.election_id.as_str());
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        for attempt in 1..=self.attempts() {
            let (voter, voter_bytes) = get_record::<VoterRecord, _>(&self.store, &voter_key)?
                .ok_or(VoteError::NotRegistered)?;
            if !voter.state().can_vote() {
                tracing::warn!(voter = handle.short(), source, "repeat vote attempt rejected");
                self.abuse.record_failure(source, now);
                return Err(VoteError::AlreadyVoted);
            }

            let (mut election, election_bytes) =
                get_record::<Election, _>(&self.store, &election_key)?
                    .ok_or(VoteError::ElectionNotFound)?;
            if !election.active {
                return Err(VoteError::ElectionClosed);
            }
            if !election.record_vote(candidate) {
                return Err(VoteError::CandidateNotFound);
            }

            let receipt_code = self.fresh_receipt_code()?;
            let signature = self.signer.sign_vote_fact(candidate, &handle, now)?;
            let token = self
                .tokens
                .issue(&handle, self.config.token_ttl_minutes, now)?;
            let receipt = Receipt {
                transaction_ref: transaction_ref(&receipt_code, &handle, candidate, now),
                receipt_code: receipt_code.clone(),
                voter_handle: handle.clone(),
                candidate_id: candidate,
                timestamp: now,
            };
            let voted = voter.with_vote(candidate, now, receipt_code.clone());
            let receipt_key = keys::receipt(&receipt_code);

            let batch = WriteBatch::new()
                .expect_value(election_key.clone(), election_bytes)
                .expect_value(voter_key.clone(), voter_bytes)
                .expect_absent(receipt_key.clone())
                .put(election_key.clone(), encode(&election)?)
                .put(voter_key.clone(), encode(&voted)?)
                .put(receipt_key, encode(&receipt)?);
            let batch = TokenRegistry::stage(batch, &token)?;

            match self.store.commit(batch) {
                Ok(()) => {
                    tracing::info!(
                        voter = handle.short(),
                        candidate = %candidate,
                        receipt = %receipt_code,
                        "vote recorded"
                    );
                    return Ok(CastVoteResponse {
                        success: true,
                        receipt_code,
                        signature,
                        token: token.token,
                        expires_at: token.expires_at,
                        timestamp: now,
                    });
                }
                Err(StoreError::Conflict(_)) => {
                    tracing::debug!(attempt, voter = handle.short(), "vote commit conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.exhausted("vote"))
    }

    /// Whether the registered voter behind `identity` has voted.
    pub fn has_voted(&self, identity: &str, source: &str) -> Result<bool, VoteError> {
        let now = self.clock.now();
        self.admit(source, now)?;
        self.validated(identity, source, now)?;
        let handle = self.locate(identity)?.ok_or(VoteError::NotRegistered)?;
        let (voter, _) = get_record::<VoterRecord, _>(&self.store, &keys::voter(&handle))?
            .ok_or(VoteError::NotRegistered)?;
        tracing::debug!(voter = handle.short(), has_voted = voter.has_voted, "vote status looked up");
        Ok(voter.has_voted)
    }

    /// Consume the vote's security token, then check its signature.
    ///
    /// Token failures are errors, and an expired token reports
    /// `TokenExpired` whatever identity is presented. A valid token with a
    /// signature that does not match the vote fact yields `Ok(false)`; the
    /// token is spent either way. Signature failures here are not counted
    /// against any source, since no source is presented.
    pub fn verify_vote(
        &self,
        signature: &str,
        candidate: CandidateId,
        identity: &str,
        timestamp: Timestamp,
        token: &str,
        expires_at: Timestamp,
    ) -> Result<bool, VoteError> {
        let now = self.clock.now();
        let located = self.locate(identity)?;
        self.tokens
            .verify(&self.store, token, located.as_ref(), expires_at, now)?;
        // The token check rejects an identity with no handle.
        let handle = located.ok_or(VoteError::TokenMismatch)?;

        let verified = self
            .signer
            .verify_vote_fact(signature, candidate, &handle, timestamp);
        if verified {
            tracing::info!(voter = handle.short(), "vote verified");
        } else {
            tracing::warn!(voter = handle.short(), "vote signature did not verify");
        }
        Ok(verified)
    }

    // ── Read-only projections ──────────────────────────────────────────

    pub fn tally(&self, election_id: &ElectionId) -> Result<TallyResponse, VoteError> {
        let (election, _) = get_record::<Election, _>(&self.store, &keys::election(election_id))?
            .ok_or(VoteError::ElectionNotFound)?;
        tracing::debug!(election = %election_id, total = election.total_votes, "tally read");
        Ok(TallyResponse::from(&election))
    }

    pub fn verify_receipt(&self, receipt_code: &str) -> Result<Receipt, VoteError> {
        // A malformed code cannot name a stored receipt.
        let code = ReceiptCode::parse(receipt_code).map_err(|_| VoteError::ReceiptNotFound)?;
        let (receipt, _) = get_record::<Receipt, _>(&self.store, &keys::receipt(&code))?
            .ok_or(VoteError::ReceiptNotFound)?;
        tracing::debug!(receipt = %code, "receipt looked up");
        Ok(receipt)
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Create an active election with zeroed counts.
    pub fn create_election(
        &self,
        id: ElectionId,
        candidates: Vec<Candidate>,
    ) -> Result<Election, VoteError> {
        if candidates.is_empty() {
            return Err(VoteError::InvalidElection("no candidates".to_string()));
        }
        let election = Election::new(id.clone(), candidates)
            .map_err(|e| VoteError::InvalidElection(e.to_string()))?;
        let key = keys::election(&id);
        let batch = WriteBatch::new()
            .expect_absent(key.clone())
            .put(key, encode(&election)?);

        match self.store.commit(batch) {
            Ok(()) => {
                tracing::info!(election = %id, candidates = election.candidates.len(), "election created");
                Ok(election)
            }
            Err(StoreError::Conflict(_)) => Err(VoteError::ElectionExists(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Open or close an election.
    pub fn set_election_active(
        &self,
        id: &ElectionId,
        active: bool,
    ) -> Result<Election, VoteError> {
        let key = keys::election(id);
        let lock = self.election_locks.get(id.as_str());
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..self.attempts() {
            let (mut election, bytes) = get_record::<Election, _>(&self.store, &key)?
                .ok_or(VoteError::ElectionNotFound)?;
            if election.active == active {
                return Ok(election);
            }
            election.active = active;
            if self
                .store
                .compare_and_swap(&key, Some(&bytes), &encode(&election)?)?
            {
                tracing::info!(election = %id, active, "election status changed");
                return Ok(election);
            }
        }
        Err(self.exhausted("election status change"))
    }

    /// Lift a suspicion flag. Returns `false` if nothing was tracked.
    pub fn clear_suspicion(&self, source: &str) -> bool {
        self.abuse.clear(source)
    }

    /// Evict idle rate-limit entries and stale failure counters.
    pub fn sweep_abuse_state(&self) {
        self.abuse.sweep(self.clock.now());
        let (limited, counters, flagged) = self.abuse.tracked();
        tracing::debug!(limited, counters, flagged, "abuse state swept");
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn attempts(&self) -> u32 {
        self.config.commit_retries.max(1)
    }

    fn exhausted(&self, what: &str) -> VoteError {
        tracing::warn!(attempts = self.attempts(), "{what} kept conflicting, giving up");
        VoteError::Unavailable(format!(
            "{what} did not commit after {} attempts",
            self.attempts()
        ))
    }

    fn admit(&self, source: &str, now: Timestamp) -> Result<(), VoteError> {
        match self.abuse.admit(source, now) {
            Verdict::Allowed => Ok(()),
            Verdict::RateLimited => Err(VoteError::RateLimited),
            Verdict::Suspicious => Err(VoteError::Suspicious),
        }
    }

    /// Validate `identity`, striking `source` on failure.
    fn validated(&self, identity: &str, source: &str, now: Timestamp) -> Result<(), VoteError> {
        match validate(identity) {
            Validation::Valid => Ok(()),
            invalid => {
                let reasons = invalid.reasons();
                tracing::warn!(source, reasons = ?reasons, "identity validation failed");
                self.abuse.record_failure(source, now);
                Err(VoteError::ValidationError { reasons })
            }
        }
    }

    /// The handle registered for `identity`, if any.
    fn locate(&self, identity: &str) -> Result<Option<VoterHandle>, VoteError> {
        let locator = self.signer.locator(identity)?;
        self.read_locator(identity, &keys::locator(&locator))
    }

    fn read_locator(
        &self,
        identity: &str,
        locator_key: &str,
    ) -> Result<Option<VoterHandle>, VoteError> {
        let Some((entry, _)) = get_record::<VoterLocator, _>(&self.store, locator_key)? else {
            return Ok(None);
        };
        if !Anonymizer::verify(identity, &entry.salt, &entry.handle) {
            return Err(StoreError::Corruption(format!(
                "{locator_key}: stored salt does not reproduce handle"
            ))
            .into());
        }
        Ok(Some(entry.handle))
    }

    /// Draw receipt codes until one is unused.
    fn fresh_receipt_code(&self) -> Result<ReceiptCode, VoteError> {
        let attempts = self.config.receipt_code_attempts.max(1);
        for _ in 0..attempts {
            let code = self.entropy.receipt_code()?;
            if self.store.get(&keys::receipt(&code))?.is_none() {
                return Ok(code);
            }
            tracing::debug!(receipt = %code, "receipt code collision, drawing again");
        }
        Err(VoteError::Unavailable(format!(
            "no unused receipt code after {attempts} attempts"
        )))
    }
}
