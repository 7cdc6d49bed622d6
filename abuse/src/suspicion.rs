//! Per-source failure counting with sticky suspicion flags.

use ballotguard_types::Timestamp;
use std::collections::HashMap;

/// Default number of failures before a source is flagged.
pub const DEFAULT_SUSPICION_THRESHOLD: u32 = 3;

/// Default idle time before an unflagged failure counter is swept (24 h).
pub const DEFAULT_FAILURE_MEMORY_MS: u64 = 86_400_000;

/// Failure count for one source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbuseCounter {
    pub source_key: String,
    pub failure_count: u32,
    /// Time of the first failure counted in this entry.
    pub window_start: Timestamp,
    /// Time of the most recent failure (eviction order).
    pub last_failure: Timestamp,
}

/// Flags a source as suspicious once it accumulates `threshold` failures.
///
/// Flags do not age out; [`SuspicionTracker::clear`] removes them. Both
/// the counters and the flags are capped at `max_sources` entries. A full
/// counter map drops the least recently failing source, and a full flag
/// map drops the oldest flag.
pub struct SuspicionTracker {
    threshold: u32,
    max_sources: usize,
    counters: HashMap<String, AbuseCounter>,
    /// Flagged source to the time it was flagged.
    flagged: HashMap<String, Timestamp>,
}

impl SuspicionTracker {
    pub fn new(threshold: u32, max_sources: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            max_sources,
            counters: HashMap::new(),
            flagged: HashMap::new(),
        }
    }

    /// Whether `source` has been flagged.
    pub fn is_suspicious(&self, source: &str) -> bool {
        self.flagged.contains_key(source)
    }

    /// Count one failure for `source`. Returns `true` if the source is
    /// (now or already) suspicious.
    pub fn record_failure(&mut self, source: &str, now: Timestamp) -> bool {
        if self.flagged.contains_key(source) {
            return true;
        }
        if !self.counters.contains_key(source) && self.counters.len() >= self.max_sources {
            self.evict_oldest();
        }

        let counter = self
            .counters
            .entry(source.to_string())
            .or_insert_with(|| AbuseCounter {
                source_key: source.to_string(),
                failure_count: 0,
                window_start: now,
                last_failure: now,
            });
        counter.failure_count += 1;
        counter.last_failure = now;

        if counter.failure_count >= self.threshold {
            self.counters.remove(source);
            if self.flagged.len() >= self.max_sources {
                self.evict_oldest_flag();
            }
            self.flagged.insert(source.to_string(), now);
            tracing::warn!(source, "source flagged as suspicious");
            return true;
        }
        false
    }

    /// Administrative reset: forget all failures and the flag for `source`.
    pub fn clear(&mut self, source: &str) -> bool {
        let had_counter = self.counters.remove(source).is_some();
        let was_flagged = self.flagged.remove(source).is_some();
        had_counter || was_flagged
    }

    /// Drop unflagged counters whose last failure is older than `max_age_ms`.
    pub fn sweep(&mut self, now: Timestamp, max_age_ms: u64) {
        self.counters
            .retain(|_, c| c.last_failure.elapsed_since(now) < max_age_ms);
    }

    pub fn tracked_sources(&self) -> usize {
        self.counters.len()
    }

    pub fn flagged_sources(&self) -> usize {
        self.flagged.len()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .counters
            .values()
            .min_by_key(|c| c.last_failure)
            .map(|c| c.source_key.clone());
        if let Some(key) = oldest {
            self.counters.remove(&key);
        }
    }

    fn evict_oldest_flag(&mut self) {
        let oldest = self
            .flagged
            .iter()
            .min_by_key(|(_, flagged_at)| **flagged_at)
            .map(|(source, _)| source.clone());
        if let Some(source) = oldest {
            self.flagged.remove(&source);
            tracing::warn!(source = %source, "suspicion flag evicted, flag map full");
        }
    }
}

impl Default for SuspicionTracker {
    fn default() -> Self {
        Self::new(
            DEFAULT_SUSPICION_THRESHOLD,
            crate::rate_limiter::DEFAULT_MAX_SOURCES,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ms: u64) -> Timestamp {
        Timestamp::new(ms)
    }

    fn failures(tracker: &SuspicionTracker, source: &str) -> u32 {
        tracker.counters.get(source).map_or(0, |c| c.failure_count)
    }

    #[test]
    fn flagged_on_third_failure() {
        let mut tracker = SuspicionTracker::default();
        assert!(!tracker.record_failure("ip", t(0)));
        assert!(!tracker.record_failure("ip", t(1)));
        assert!(!tracker.is_suspicious("ip"));
        assert!(tracker.record_failure("ip", t(2)));
        assert!(tracker.is_suspicious("ip"));
    }

    #[test]
    fn flag_is_sticky_until_cleared() {
        let mut tracker = SuspicionTracker::new(1, 10);
        tracker.record_failure("ip", t(0));
        tracker.sweep(t(1_000_000), 1);
        assert!(tracker.is_suspicious("ip"));
        assert!(tracker.clear("ip"));
        assert!(!tracker.is_suspicious("ip"));
        assert_eq!(failures(&tracker, "ip"), 0);
    }

    #[test]
    fn clear_unknown_source_is_noop() {
        let mut tracker = SuspicionTracker::default();
        assert!(!tracker.clear("nobody"));
    }

    #[test]
    fn counter_tracks_window_start() {
        let mut tracker = SuspicionTracker::default();
        tracker.record_failure("ip", t(100));
        tracker.record_failure("ip", t(250));
        let c = &tracker.counters["ip"];
        assert_eq!(c.failure_count, 2);
        assert_eq!(c.window_start, t(100));
        assert_eq!(c.last_failure, t(250));
    }

    #[test]
    fn capacity_evicts_least_recent_counter_but_not_flags() {
        let mut tracker = SuspicionTracker::new(2, 2);
        tracker.record_failure("flagged", t(0));
        tracker.record_failure("flagged", t(1));
        tracker.record_failure("a", t(10));
        tracker.record_failure("b", t(20));
        tracker.record_failure("c", t(30));
        assert_eq!(tracker.tracked_sources(), 2);
        assert_eq!(failures(&tracker, "a"), 0);
        assert!(tracker.is_suspicious("flagged"));
    }

    #[test]
    fn sweep_drops_stale_counters() {
        let mut tracker = SuspicionTracker::default();
        tracker.record_failure("old", t(0));
        tracker.record_failure("new", t(900));
        tracker.sweep(t(1_000), 500);
        assert_eq!(failures(&tracker, "old"), 0);
        assert_eq!(failures(&tracker, "new"), 1);
    }

    #[test]
    fn flag_map_is_capped_oldest_first() {
        let mut tracker = SuspicionTracker::new(1, 10);
        for i in 0..1_000u64 {
            tracker.record_failure(&format!("10.0.{}.{}", i / 256, i % 256), t(i));
        }
        assert_eq!(tracker.flagged_sources(), 10);
        assert!(!tracker.is_suspicious("10.0.0.0"));
        assert!(tracker.is_suspicious("10.0.3.231"));
    }
}
