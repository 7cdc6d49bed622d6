//! Per-source sliding-window request limiter.

use ballotguard_types::Timestamp;
use std::collections::{HashMap, VecDeque};

/// Default window: one minute.
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

/// Default maximum requests per source per window.
pub const DEFAULT_MAX_REQUESTS: usize = 10;

/// Default cap on tracked sources before an eviction sweep runs.
pub const DEFAULT_MAX_SOURCES: usize = 10_000;

/// Sliding-window limiter keyed by source address.
///
/// Every check records the call, so a source that keeps calling while
/// limited stays limited until it backs off for a full window.
pub struct SlidingWindowLimiter {
    window_ms: u64,
    max_requests: usize,
    max_sources: usize,
    /// source -> call times inside the window, oldest first
    calls: HashMap<String, VecDeque<Timestamp>>,
}

impl SlidingWindowLimiter {
    pub fn new(window_ms: u64, max_requests: usize, max_sources: usize) -> Self {
        Self {
            window_ms,
            max_requests,
            max_sources,
            calls: HashMap::new(),
        }
    }

    /// Record a call from `source` at `now`.
    ///
    /// Returns `true` if the source is over its limit.
    pub fn check(&mut self, source: &str, now: Timestamp) -> bool {
        if !self.calls.contains_key(source) && self.calls.len() >= self.max_sources {
            self.sweep(now);
        }

        let window_ms = self.window_ms;
        let times = self.calls.entry(source.to_string()).or_default();
        prune(times, window_ms, now);
        times.push_back(now);
        times.len() > self.max_requests
    }

    /// Drop sources with no calls left in the window; if the map is still at
    /// capacity, evict the sources whose latest call is oldest.
    pub fn sweep(&mut self, now: Timestamp) {
        let window_ms = self.window_ms;
        self.calls.retain(|_, times| {
            prune(times, window_ms, now);
            !times.is_empty()
        });

        if self.calls.len() >= self.max_sources {
            let mut by_recency: Vec<(String, Timestamp)> = self
                .calls
                .iter()
                .filter_map(|(k, v)| v.back().map(|t| (k.clone(), *t)))
                .collect();
            by_recency.sort_by_key(|(_, t)| *t);
            let excess = self.calls.len() + 1 - self.max_sources;
            for (key, _) in by_recency.into_iter().take(excess) {
                self.calls.remove(&key);
            }
        }
    }

    /// Calls currently counted against `source`.
    pub fn count(&self, source: &str) -> usize {
        self.calls.get(source).map_or(0, |v| v.len())
    }

    /// Number of tracked sources.
    pub fn tracked_sources(&self) -> usize {
        self.calls.len()
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS, DEFAULT_MAX_REQUESTS, DEFAULT_MAX_SOURCES)
    }
}

fn prune(times: &mut VecDeque<Timestamp>, window_ms: u64, now: Timestamp) {
    while let Some(oldest) = times.front() {
        if oldest.elapsed_since(now) >= window_ms {
            times.pop_front();
        } else {
            break;
        }
    }
}
