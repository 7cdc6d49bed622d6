//! Abuse detection keyed by source address.
//!
//! Two independent mechanisms:
//! - [`SlidingWindowLimiter`] limits call volume per source, regardless of
//!   whether the calls succeed.
//! - [`SuspicionTracker`] counts explicit failures per source and flags the
//!   source permanently (until cleared) once a threshold is reached.
//!
//! [`AbuseDetector`] wraps both behind locks so it can be shared between
//! request handlers. Counts are best-effort: a momentary undercount under
//! contention only weakens detection.

pub mod detector;
pub mod rate_limiter;
pub mod suspicion;

pub use detector::{AbuseConfig, AbuseDetector, Verdict};
pub use rate_limiter::SlidingWindowLimiter;
pub use suspicion::{AbuseCounter, SuspicionTracker};
