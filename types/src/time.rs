//! Timestamp type and clock abstraction.
//!
//! Timestamps are Unix epoch milliseconds (UTC). The rate limiter windows,
//! token expiry and vote-fact signatures all work in this unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in milliseconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current system time as a `Timestamp`.
    ///
    /// A system clock set before the Unix epoch reads as [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// This timestamp shifted forward by `millis`, saturating at `u64::MAX`.
    pub fn plus_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// This timestamp shifted forward by whole minutes.
    pub fn plus_minutes(&self, minutes: u64) -> Self {
        self.plus_millis(minutes.saturating_mul(60_000))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of the current time.
///
/// The orchestrator never reads the system clock directly, so tests can
/// drive time deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
