//! Staleness tracking and the large-task gate for a shared lexicon file.
//!
//! One `UpdateController` is shared by every lexicon instance that opens the
//! same filename; it records when the file was last updated and when an
//! update was last requested, and gates large tasks (rebuild, compaction,
//! bulk insert) so at most one runs against the file at a time. A second,
//! private controller per instance acts as that instance's local snapshot,
//! used to notice that another instance already produced a newer artifact.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Per-filename record of update activity plus the large-task gate.
///
/// Shared controllers live in the registry for the life of the process and
/// are never destroyed.
#[derive(Debug, Default)]
pub struct UpdateController {
    last_update_time: AtomicU64,
    last_update_request_time: AtomicU64,
    processing_large_task: AtomicBool,
}

impl UpdateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_update_time(&self) -> u64 {
        self.last_update_time.load(Ordering::SeqCst)
    }

    pub fn last_update_request_time(&self) -> u64 {
        self.last_update_request_time.load(Ordering::SeqCst)
    }

    pub fn set_last_update_time(&self, ticks: u64) {
        self.last_update_time.store(ticks, Ordering::SeqCst);
    }

    pub fn set_last_update_request_time(&self, ticks: u64) {
        self.last_update_request_time.store(ticks, Ordering::SeqCst);
    }

    /// An update has been requested more recently than the last completed
    /// update, so a reload is owed.
    pub fn is_out_of_date(&self) -> bool {
        self.last_update_request_time() > self.last_update_time()
    }

    /// Whether a large task currently holds the file. Latency-sensitive
    /// reads consult this and fall back instead of queueing behind it.
    pub fn processing_large_task(&self) -> bool {
        self.processing_large_task.load(Ordering::SeqCst)
    }

    /// Claim the file for a large task. Returns false when another large
    /// task already holds it.
    pub fn try_begin_large_task(&self) -> bool {
        self.processing_large_task
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the large-task gate. Prefer [`HeldGate`] so the release
    /// happens on every exit path of the guarded work.
    pub fn end_large_task(&self) {
        self.processing_large_task.store(false, Ordering::SeqCst);
    }
}

/// Releases a held large-task gate on drop, panics included.
///
/// Does not acquire: the caller must already have won
/// [`UpdateController::try_begin_large_task`]. Owns its controller so it can
/// be moved into a queued task; if the task is dropped without running, the
/// gate is still released.
pub struct HeldGate(Arc<UpdateController>);

impl HeldGate {
    pub fn new(controller: Arc<UpdateController>) -> Self {
        Self(controller)
    }
}

impl Drop for HeldGate {
    fn drop(&mut self) {
        self.0.end_large_task();
    }
}
