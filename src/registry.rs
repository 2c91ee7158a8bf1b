//! Process-wide registry of per-filename controllers and task lanes.
//!
//! Every lexicon instance opening the same filename must share one
//! [`UpdateController`] and one [`SerialLane`]; this registry is where that
//! sharing happens. Entries are created on first access and live for the
//! rest of the process; key cardinality is bounded in practice (one entry
//! per dictionary file), so there is deliberately no deletion API.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::controller::UpdateController;
use crate::lane::SerialLane;

static GLOBAL: Lazy<LexiconRegistry> = Lazy::new(LexiconRegistry::new);

struct RegistryEntry {
    controller: Arc<UpdateController>,
    lane: Arc<SerialLane>,
}

/// Maps a lexicon filename to its shared controller and lane.
///
/// Most callers go through [`LexiconRegistry::global`]; tests that want key
/// isolation can construct private registries instead.
pub struct LexiconRegistry {
    entries: Mutex<HashMap<String, RegistryEntry>>,
}

impl LexiconRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static LexiconRegistry {
        &GLOBAL
    }

    /// Shared controller and lane for `filename`, created together on first
    /// access. Idempotent: racing first accesses still observe exactly one
    /// controller/lane pair per filename.
    pub fn pair_for(&self, filename: &str) -> (Arc<UpdateController>, Arc<SerialLane>) {
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(filename.to_string())
            .or_insert_with(|| RegistryEntry {
                controller: Arc::new(UpdateController::new()),
                lane: SerialLane::new(filename),
            });
        (Arc::clone(&entry.controller), Arc::clone(&entry.lane))
    }

    pub fn controller_for(&self, filename: &str) -> Arc<UpdateController> {
        self.pair_for(filename).0
    }

    pub fn lane_for(&self, filename: &str) -> Arc<SerialLane> {
        self.pair_for(filename).1
    }

    /// Number of filenames seen so far.
    pub fn key_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for LexiconRegistry {
    fn default() -> Self {
        Self::new()
    }
}
