//! Monotonic clock for the staleness protocol.
//!
//! Update and update-request times are compared against each other, never
//! against wall-clock time, so all they need is a monotonic millisecond
//! counter. Wall-clock timestamps only appear in artifact header attributes.

use std::time::Instant;

use once_cell::sync::Lazy;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Milliseconds elapsed since the process first touched this clock.
///
/// Two calls within the same millisecond return the same tick; the staleness
/// comparison is strict, so callers must not rely on sub-millisecond
/// ordering.
pub fn uptime_millis() -> u64 {
    EPOCH.elapsed().as_millis() as u64
}
