//! Single-shot result handoff between a lane task and a bounded waiter.
//!
//! The read path submits a priority task and waits on a `ResultSlot` with a
//! hard deadline. The producer side never blocks: publishing after the
//! waiter gave up simply parks the value where nobody will look at it, so a
//! timed-out read neither leaks the background task nor stalls it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

struct Slot<T> {
    value: Mutex<Option<T>>,
    ready: Condvar,
}

/// One value, set at most once, consumed by at most one bounded `get`.
pub struct ResultSlot<T> {
    inner: Arc<Slot<T>>,
}

impl<T> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Slot {
                value: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// Publish the result. Never blocks, regardless of whether anyone is
    /// still waiting.
    pub fn set(&self, value: T) {
        let mut slot = self.inner.value.lock();
        *slot = Some(value);
        self.inner.ready.notify_all();
    }

    /// Wait up to `timeout` for the value; return `default` if it does not
    /// arrive in time.
    pub fn get(&self, default: T, timeout: Duration) -> T {
        let deadline = Instant::now() + timeout;
        let mut slot = self.inner.value.lock();
        while slot.is_none() {
            if Instant::now() >= deadline {
                break;
            }
            if self.inner.ready.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        slot.take().unwrap_or(default)
    }
}

impl<T> Clone for ResultSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
