//! Shared front door combining the rate limiter and the suspicion tracker.

use crate::rate_limiter::{
    SlidingWindowLimiter, DEFAULT_MAX_REQUESTS, DEFAULT_MAX_SOURCES, DEFAULT_WINDOW_MS,
};
use crate::suspicion::{
    SuspicionTracker, DEFAULT_FAILURE_MEMORY_MS, DEFAULT_SUSPICION_THRESHOLD,
};
use ballotguard_types::Timestamp;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Tuning for [`AbuseDetector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbuseConfig {
    pub window_ms: u64,
    pub max_requests: usize,
    pub suspicion_threshold: u32,
    /// Idle time after which a sweep forgets an unflagged failure counter.
    pub failure_memory_ms: u64,
    pub max_tracked_sources: usize,
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            max_requests: DEFAULT_MAX_REQUESTS,
            suspicion_threshold: DEFAULT_SUSPICION_THRESHOLD,
            failure_memory_ms: DEFAULT_FAILURE_MEMORY_MS,
            max_tracked_sources: DEFAULT_MAX_SOURCES,
        }
    }
}

/// Result of admitting a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    RateLimited,
    Suspicious,
}

/// Thread-safe abuse detector.
///
/// A poisoned lock is recovered rather than propagated: the counters are
/// advisory and a panic elsewhere must not take voting down with it.
pub struct AbuseDetector {
    config: AbuseConfig,
    limiter: Mutex<SlidingWindowLimiter>,
    tracker: Mutex<SuspicionTracker>,
}

impl AbuseDetector {
    pub fn new(config: AbuseConfig) -> Self {
        Self {
            config,
            limiter: Mutex::new(SlidingWindowLimiter::new(
                config.window_ms,
                config.max_requests,
                config.max_tracked_sources,
            )),
            tracker: Mutex::new(SuspicionTracker::new(
                config.suspicion_threshold,
                config.max_tracked_sources,
            )),
        }
    }

    pub fn config(&self) -> &AbuseConfig {
        &self.config
    }

    fn limiter(&self) -> MutexGuard<'_, SlidingWindowLimiter> {
        self.limiter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tracker(&self) -> MutexGuard<'_, SuspicionTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count a request from `source` and decide whether to admit it.
    pub fn admit(&self, source: &str, now: Timestamp) -> Verdict {
        if self.limiter().check(source, now) {
            tracing::warn!(source, "request rate limited");
            return Verdict::RateLimited;
        }
        if self.tracker().is_suspicious(source) {
            tracing::warn!(source, "request from suspicious source rejected");
            return Verdict::Suspicious;
        }
        Verdict::Allowed
    }

    /// Record a validation or signature failure from `source`.
    pub fn record_failure(&self, source: &str, now: Timestamp) -> bool {
        self.tracker().record_failure(source, now)
    }

    pub fn is_suspicious(&self, source: &str) -> bool {
        self.tracker().is_suspicious(source)
    }

    /// Administrative reset of `source`'s suspicion state.
    pub fn clear(&self, source: &str) -> bool {
        let cleared = self.tracker().clear(source);
        if cleared {
            tracing::info!(source, "suspicion cleared");
        }
        cleared
    }

    /// Time-windowed eviction of idle rate-limit entries and stale failure
    /// counters. Rate-limit entries age out with the request window and
    /// counters with `failure_memory_ms`. Suspicion flags are kept.
    pub fn sweep(&self, now: Timestamp) {
        self.limiter().sweep(now);
        self.tracker().sweep(now, self.config.failure_memory_ms);
    }

    /// `(rate-limited sources, failure counters, flagged sources)`.
    pub fn tracked(&self) -> (usize, usize, usize) {
        let tracker = self.tracker();
        (
            self.limiter().tracked_sources(),
            tracker.tracked_sources(),
            tracker.flagged_sources(),
        )
    }
}

impl Default for AbuseDetector {
    fn default() -> Self {
        Self::new(AbuseConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn detector(max_requests: usize) -> AbuseDetector {
        AbuseDetector::new(AbuseConfig {
            window_ms: 60_000,
            max_requests,
            suspicion_threshold: 3,
            failure_memory_ms: 3_600_000,
            max_tracked_sources: 100,
        })
    }

    #[test]
    fn rate_limit_reported_before_suspicion() {
        let d = detector(1);
        for i in 0..3 {
            d.record_failure("ip", Timestamp::new(i));
        }
        assert_eq!(d.admit("ip", Timestamp::new(10)), Verdict::Suspicious);
        assert_eq!(d.admit("ip", Timestamp::new(11)), Verdict::RateLimited);
    }

    #[test]
    fn clear_restores_admission() {
        let d = detector(100);
        for i in 0..3 {
            d.record_failure("ip", Timestamp::new(i));
        }
        assert!(d.is_suspicious("ip"));
        assert!(d.clear("ip"));
        assert_eq!(d.admit("ip", Timestamp::new(5)), Verdict::Allowed);
    }

    #[test]
    fn sweep_keeps_flags() {
        let d = detector(100);
        for i in 0..3 {
            d.record_failure("bad", Timestamp::new(i));
        }
        d.record_failure("meh", Timestamp::new(0));
        d.admit("idle", Timestamp::new(0));
        d.sweep(Timestamp::new(3_600_000));
        assert_eq!(d.tracked(), (0, 0, 1));
        assert!(d.is_suspicious("bad"));
    }

    #[test]
    fn failures_outlive_the_request_window() {
        let d = detector(100);
        d.record_failure("ip", Timestamp::new(0));
        d.sweep(Timestamp::new(90_000));
        d.record_failure("ip", Timestamp::new(90_000));
        d.sweep(Timestamp::new(180_000));
        assert!(d.record_failure("ip", Timestamp::new(180_000)));
        assert_eq!(d.admit("ip", Timestamp::new(180_001)), Verdict::Suspicious);
    }

    #[test]
    fn flagged_sources_are_bounded() {
        let d = AbuseDetector::new(AbuseConfig {
            suspicion_threshold: 1,
            max_tracked_sources: 10,
            ..AbuseConfig::default()
        });
        for i in 0..1_000u64 {
            d.record_failure(&format!("source-{i}"), Timestamp::new(i));
        }
        d.sweep(Timestamp::new(1_000));
        assert_eq!(d.tracked(), (0, 0, 10));
        assert!(d.is_suspicious("source-999"));
    }

    #[test]
    fn concurrent_admission_is_bounded() {
        let d = Arc::new(detector(5));
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let d = Arc::clone(&d);
                thread::spawn(move || d.admit("ip", Timestamp::new(1)))
            })
            .collect();
        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|v| *v == Verdict::Allowed)
            .count();
        assert_eq!(allowed, 5);
    }
}
