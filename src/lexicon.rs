//! Expandable lexicon instances and the reload/build pipeline.
//!
//! An [`ExpandableLexicon`] is one logical dictionary: a locale, an
//! updatable flag, an optional in-memory writer, and a handle to the
//! compiled artifact answering its queries. Several instances may share one
//! artifact file; the registry hands them the same update controller and
//! task lane for that filename, and every operation that touches the
//! artifact is executed as a lane task so only one runs at a time.
//!
//! # Reload pipeline
//!
//! ```text
//! CHECK ──stale or file missing──> REBUILD ──> swap ──> VALIDATE
//!   │ (spurious request)             ^                     │
//!   ├────────> NOOP                  └──(corrupt, once)────┘
//!   └─(peer built newer)──> RELOAD ──> swap ──> VALIDATE
//! ```
//!
//! The pipeline runs entirely inside the key's lane. Reads never join it:
//! they are priority tasks with a hard deadline and fall back to an empty
//! answer when the large-task gate is held or the deadline passes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::artifact::{
    ArtifactFormat, BatchEntry, BigramEntry, CompiledArtifact, HeaderAttributes, LookupRequest,
    Suggestion, UnigramEntry, KEY_ID, KEY_LOCALE, KEY_VERSION,
};
use crate::clock;
use crate::controller::{HeldGate, UpdateController};
use crate::error::{LexstoreError, Result};
use crate::holder::ResultSlot;
use crate::lane::{SerialLane, TaskHandle};
use crate::registry::LexiconRegistry;
use crate::writer::LexiconWriter;

/// Extension for on-disk lexicon files.
pub const DICT_FILE_EXTENSION: &str = ".dict";

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// External backing source for one lexicon instance.
pub trait LexiconSource: Send {
    /// Whether the backing content changed since the artifact was last
    /// built. Only consulted while the key's large-task gate is held.
    fn has_content_changed(&mut self) -> bool;

    /// Whether a rebuild must repopulate the writer from source before
    /// writing. Writer-less instances return false and flush the artifact
    /// in place instead.
    fn needs_reload_before_writing(&self) -> bool;

    /// Populate `writer` with current source content. Only called during a
    /// rebuild, inside the key's task lane.
    fn load_into(&mut self, writer: &mut dyn LexiconWriter) -> Result<()>;
}

/// Tunables for an [`ExpandableLexicon`].
#[derive(Debug, Clone)]
pub struct LexiconOptions {
    /// Hard budget for latency-sensitive reads before they fall back.
    pub read_timeout: Duration,
}

impl Default for LexiconOptions {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

struct LexiconState {
    filename: String,
    dir: PathBuf,
    locale: String,
    kind: String,
    updatable: bool,
    options: LexiconOptions,
    format: Arc<dyn ArtifactFormat>,
    source: Mutex<Box<dyn LexiconSource>>,
    writer: Option<Mutex<Box<dyn LexiconWriter>>>,
    /// Current artifact handle. Replaced and closed only from lane tasks;
    /// the mutex makes the handle shareable with those tasks, not the
    /// synchronization discipline.
    artifact: Mutex<Option<Box<dyn CompiledArtifact>>>,
    /// Shared across all instances opening this filename.
    shared: Arc<UpdateController>,
    /// This instance's local staleness snapshot.
    local: UpdateController,
    lane: Arc<SerialLane>,
    /// Handle of the not-yet-started debounced flush, if any.
    pending_flush: Mutex<Option<TaskHandle>>,
}

impl LexiconState {
    fn file_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    fn open_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}", self.filename, self.format.open_extension()))
    }

    fn reload_required(&self) -> bool {
        self.artifact.lock().is_none() || self.local.is_out_of_date()
    }

    fn header_attributes(&self) -> HeaderAttributes {
        let mut attributes = HeaderAttributes::new();
        attributes.set(KEY_ID, &self.filename);
        attributes.set(KEY_LOCALE, &self.locale);
        attributes.set(KEY_VERSION, chrono::Utc::now().timestamp().to_string());
        attributes
    }
}

/// One logical dictionary backed by a shared compiled artifact.
///
/// Cheap to query, expensive to rebuild; rebuilds, compactions and bulk
/// writes happen in the background on the key's lane while reads keep being
/// answered within their deadline (possibly by the fallback value).
pub struct ExpandableLexicon {
    state: Arc<LexiconState>,
}

impl ExpandableLexicon {
    /// Create an instance registered in the process-wide registry.
    ///
    /// `writer` is carried by instances that regenerate content from source;
    /// updatable instances that mutate the artifact in place pass `None`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dir: impl Into<PathBuf>,
        filename: impl Into<String>,
        locale: impl Into<String>,
        kind: impl Into<String>,
        updatable: bool,
        source: Box<dyn LexiconSource>,
        writer: Option<Box<dyn LexiconWriter>>,
        format: Arc<dyn ArtifactFormat>,
    ) -> Self {
        Self::with_registry(
            dir,
            filename,
            locale,
            kind,
            updatable,
            source,
            writer,
            format,
            LexiconOptions::default(),
            LexiconRegistry::global(),
        )
    }

    /// Create an instance with explicit options and registry.
    #[allow(clippy::too_many_arguments)]
    pub fn with_registry(
        dir: impl Into<PathBuf>,
        filename: impl Into<String>,
        locale: impl Into<String>,
        kind: impl Into<String>,
        updatable: bool,
        source: Box<dyn LexiconSource>,
        writer: Option<Box<dyn LexiconWriter>>,
        format: Arc<dyn ArtifactFormat>,
        options: LexiconOptions,
        registry: &LexiconRegistry,
    ) -> Self {
        let filename = filename.into();
        let (shared, lane) = registry.pair_for(&filename);
        Self {
            state: Arc::new(LexiconState {
                filename,
                dir: dir.into(),
                locale: locale.into(),
                kind: kind.into(),
                updatable,
                options,
                format,
                source: Mutex::new(source),
                writer: writer.map(Mutex::new),
                artifact: Mutex::new(None),
                shared,
                local: UpdateController::new(),
                lane,
                pending_flush: Mutex::new(None),
            }),
        }
    }

    pub fn filename(&self) -> &str {
        &self.state.filename
    }

    pub fn locale(&self) -> &str {
        &self.state.locale
    }

    /// Dictionary kind, a human-readable tag used in logs.
    pub fn kind(&self) -> &str {
        &self.state.kind
    }

    pub fn is_updatable(&self) -> bool {
        self.state.updatable
    }

    /// Whether this instance's view of the artifact is older than the most
    /// recent reload request.
    pub fn is_stale(&self) -> bool {
        self.state.local.is_out_of_date()
    }

    /// Whether the current artifact handle passes the format's integrity
    /// check. False while no handle is loaded.
    pub fn is_valid(&self) -> bool {
        let artifact = self.state.artifact.lock();
        artifact.as_ref().map(|a| a.is_valid()).unwrap_or(false)
    }

    /// Mark the lexicon out of date so the next read triggers a reload.
    ///
    /// `rebuild_required` documents whether the caller knows the source
    /// content changed; the pipeline re-asks the source either way, so the
    /// flag is advisory and only logged here.
    pub fn mark_reload_needed(&self, rebuild_required: bool) {
        let time = clock::uptime_millis();
        self.state.local.set_last_update_request_time(time);
        self.state.shared.set_last_update_request_time(time);
        tracing::debug!(
            key = %self.state.filename,
            rebuild_required,
            request = time,
            update = self.state.shared.last_update_time(),
            "reload requested"
        );
    }

    /// Load the current artifact in the background, building one if none
    /// exists yet. The usual bootstrap call after construction.
    pub fn load_if_needed(&self) {
        self.state
            .local
            .set_last_update_request_time(clock::uptime_millis());
        self.reload_if_required();
    }

    /// Start a reload if this instance is stale and the key's large-task
    /// gate is free. Non-blocking; safe to call opportunistically on every
    /// read.
    pub fn reload_if_required(&self) {
        if !self.state.reload_required() {
            return;
        }
        if !self.state.shared.try_begin_large_task() {
            return;
        }
        // The gate travels with the task: if the lane drops the submission
        // (shutdown), dropping the closure still releases it.
        let gate = HeldGate::new(Arc::clone(&self.state.shared));
        let state = Arc::clone(&self.state);
        self.state.lane.submit(move || reload_task(&state, gate));
    }

    /// Look up suggestions for a composed word. Falls back to an empty list
    /// when the artifact is busy with a large task, not yet loaded, or the
    /// read deadline passes; never blocks past the deadline and never
    /// returns an error.
    pub fn suggestions(&self, request: &LookupRequest) -> Vec<Suggestion> {
        self.reload_if_required();
        if self.state.shared.processing_large_task() {
            return Vec::new();
        }
        let slot = ResultSlot::new();
        let producer = slot.clone();
        let state = Arc::clone(&self.state);
        let request = request.clone();
        self.state.lane.submit_priority(move || {
            let artifact = state.artifact.lock();
            let result = match artifact.as_ref() {
                Some(artifact) => artifact.suggestions(&request).unwrap_or_else(|err| {
                    tracing::debug!(key = %state.filename, error = %err, "suggestion query failed");
                    Vec::new()
                }),
                None => Vec::new(),
            };
            producer.set(result);
        });
        slot.get(Vec::new(), self.state.options.read_timeout)
    }

    /// Whether `word` is present. Same bounded-latency contract as
    /// [`ExpandableLexicon::suggestions`], with `false` as the fallback.
    pub fn contains(&self, word: &str) -> bool {
        self.reload_if_required();
        if self.state.shared.processing_large_task() {
            return false;
        }
        let slot = ResultSlot::new();
        let producer = slot.clone();
        let state = Arc::clone(&self.state);
        let word = word.to_string();
        self.state.lane.submit_priority(move || {
            let artifact = state.artifact.lock();
            let present = artifact
                .as_ref()
                .map(|a| a.contains(&word))
                .unwrap_or(false);
            producer.set(present);
        });
        slot.get(false, self.state.options.read_timeout)
    }

    /// Whether the pair `prev_word`/`word` is present, with the same
    /// bounded-latency contract as [`ExpandableLexicon::contains`].
    pub fn contains_bigram(&self, prev_word: &str, word: &str) -> bool {
        self.reload_if_required();
        if self.state.shared.processing_large_task() {
            return false;
        }
        let slot = ResultSlot::new();
        let producer = slot.clone();
        let state = Arc::clone(&self.state);
        let prev_word = prev_word.to_string();
        let word = word.to_string();
        self.state.lane.submit_priority(move || {
            let artifact = state.artifact.lock();
            let present = artifact
                .as_ref()
                .map(|a| a.contains_bigram(&prev_word, &word))
                .unwrap_or(false);
            producer.set(present);
        });
        slot.get(false, self.state.options.read_timeout)
    }

    /// Add a unigram to the artifact in the background. May overwrite an
    /// existing entry. No-op with a warning on non-updatable instances.
    pub fn add_unigram_dynamically(&self, entry: UnigramEntry) {
        if !self.state.updatable {
            tracing::warn!(
                key = %self.state.filename,
                "add_unigram_dynamically called on a non-updatable lexicon"
            );
            return;
        }
        let state = Arc::clone(&self.state);
        self.state.lane.submit(move || {
            compact_if_needed_in_lane(&state, true);
            let mut artifact = state.artifact.lock();
            if let Some(artifact) = artifact.as_mut() {
                if let Err(err) = artifact.add_unigram(&entry) {
                    tracing::error!(key = %state.filename, error = %err, "failed to add unigram");
                }
            }
        });
    }

    /// Add a bigram to the artifact in the background. May overwrite an
    /// existing entry. No-op with a warning on non-updatable instances.
    pub fn add_bigram_dynamically(&self, entry: BigramEntry) {
        if !self.state.updatable {
            tracing::warn!(
                key = %self.state.filename,
                "add_bigram_dynamically called on a non-updatable lexicon"
            );
            return;
        }
        let state = Arc::clone(&self.state);
        self.state.lane.submit(move || {
            compact_if_needed_in_lane(&state, true);
            let mut artifact = state.artifact.lock();
            if let Some(artifact) = artifact.as_mut() {
                if let Err(err) = artifact.add_bigram(&entry) {
                    tracing::error!(key = %state.filename, error = %err, "failed to add bigram");
                }
            }
        });
    }

    /// Remove a bigram from the artifact in the background. No-op with a
    /// warning on non-updatable instances.
    pub fn remove_bigram_dynamically(&self, prev_word: &str, word: &str) {
        if !self.state.updatable {
            tracing::warn!(
                key = %self.state.filename,
                "remove_bigram_dynamically called on a non-updatable lexicon"
            );
            return;
        }
        let state = Arc::clone(&self.state);
        let prev_word = prev_word.to_string();
        let word = word.to_string();
        self.state.lane.submit(move || {
            compact_if_needed_in_lane(&state, true);
            let mut artifact = state.artifact.lock();
            if let Some(artifact) = artifact.as_mut() {
                if let Err(err) = artifact.remove_bigram(&prev_word, &word) {
                    tracing::error!(key = %state.filename, error = %err, "failed to remove bigram");
                }
            }
        });
    }

    /// Apply a batch of entries under the large-task gate (best effort: if a
    /// rebuild already holds the gate the batch still runs, serialized by
    /// the lane). `on_done` fires after the batch, before the gate release.
    pub fn add_entries_bulk(
        &self,
        entries: Vec<BatchEntry>,
        on_done: Option<Box<dyn FnOnce() + Send>>,
    ) {
        if !self.state.updatable {
            tracing::warn!(
                key = %self.state.filename,
                "add_entries_bulk called on a non-updatable lexicon"
            );
            return;
        }
        let state = Arc::clone(&self.state);
        self.state.lane.submit(move || {
            let locked = state.shared.try_begin_large_task();
            let _gate = locked.then(|| HeldGate::new(Arc::clone(&state.shared)));
            {
                let mut artifact = state.artifact.lock();
                if let Some(artifact) = artifact.as_mut() {
                    if let Err(err) = artifact.add_entries(&entries) {
                        tracing::error!(
                            key = %state.filename,
                            error = %err,
                            "bulk insert failed"
                        );
                    }
                }
            }
            if let Some(on_done) = on_done {
                on_done();
            }
        });
    }

    /// Check whether the artifact wants compaction and, if so, schedule a
    /// compacting flush behind currently queued time-sensitive work.
    pub fn compact_if_needed(&self, can_block: bool) {
        let state = Arc::clone(&self.state);
        self.state
            .lane
            .submit(move || compact_if_needed_in_lane(&state, can_block));
    }

    /// Schedule a plain write of current writer content to the artifact
    /// file. Bursts collapse: only the last of a run of not-yet-started
    /// flush requests executes.
    pub fn flush_async(&self) {
        let state = Arc::clone(&self.state);
        let task = move || {
            if let Err(err) = write_artifact(&state) {
                tracing::error!(key = %state.filename, error = %err, "background flush failed");
            }
        };
        let mut pending = self.state.pending_flush.lock();
        let prev = pending.take();
        *pending = self.state.lane.submit_replacing(prev, task);
    }

    /// Remove all content. Writer-backed instances clear the writer;
    /// writer-less instances recreate an empty artifact on disk.
    pub fn clear(&self) {
        let state = Arc::clone(&self.state);
        self.state.lane.submit(move || {
            if let Some(writer) = &state.writer {
                writer.lock().clear();
                return;
            }
            let mut artifact = state.artifact.lock();
            if let Some(mut old) = artifact.take() {
                old.close();
            }
            let path = state.file_path();
            if path.exists() {
                if let Err(err) = remove_path(&path) {
                    tracing::error!(
                        key = %state.filename,
                        error = %err,
                        "failed to remove artifact file"
                    );
                    return;
                }
            }
            if let Err(err) =
                state
                    .format
                    .create_empty(&path, state.format.version(), &state.header_attributes())
            {
                tracing::error!(key = %state.filename, error = %err, "failed to recreate artifact");
                return;
            }
            match state.format.open(&state.open_path(), state.updatable) {
                Ok(empty) => *artifact = Some(empty),
                Err(err) => {
                    tracing::error!(
                        key = %state.filename,
                        error = %err,
                        "failed to reopen cleared artifact"
                    );
                }
            }
        });
    }

    /// Schedule final teardown of this instance's artifact handle. The
    /// shared file, controller and lane stay alive for other instances.
    pub fn close(&self) {
        let state = Arc::clone(&self.state);
        self.state.lane.submit(move || {
            if let Some(mut artifact) = state.artifact.lock().take() {
                artifact.close();
            }
        });
    }

    // ========== Test hooks ==========

    /// Block until the key's lane has drained, up to `timeout`.
    pub fn drain_for_tests(&self, timeout: Duration) -> bool {
        self.state.lane.wait_idle(timeout)
    }

    /// Force a compacting flush, taking the gate if it is free.
    pub fn compact_for_tests(&self) {
        let state = Arc::clone(&self.state);
        self.state.lane.submit_priority(move || {
            let locked = state.shared.try_begin_large_task();
            let _gate = locked.then(|| HeldGate::new(Arc::clone(&state.shared)));
            let mut artifact = state.artifact.lock();
            if let Some(artifact) = artifact.as_mut() {
                if let Err(err) = artifact.flush_with_compaction() {
                    tracing::error!(key = %state.filename, error = %err, "forced compaction failed");
                }
            }
        });
    }

    /// Direct presence probe that skips the reload trigger and the gate
    /// check, for verifying terminal state.
    pub fn contains_for_tests(&self, word: &str) -> bool {
        let slot = ResultSlot::new();
        let producer = slot.clone();
        let state = Arc::clone(&self.state);
        let word = word.to_string();
        self.state.lane.submit_priority(move || {
            let artifact = state.artifact.lock();
            let present = artifact
                .as_ref()
                .map(|a| a.contains(&word))
                .unwrap_or(false);
            producer.set(present);
        });
        slot.get(false, self.state.options.read_timeout)
    }

    pub fn shutdown_lane_for_tests(&self) {
        self.state.lane.shutdown();
    }

    pub fn is_lane_terminated_for_tests(&self) -> bool {
        self.state.lane.is_terminated()
    }
}

impl Drop for ExpandableLexicon {
    fn drop(&mut self) {
        self.close();
    }
}

/// The reload pipeline body. Runs as a lane task; the caller has already
/// taken the large-task gate and hands it over, so it is released on every
/// exit path here.
fn reload_task(state: &Arc<LexiconState>, gate: HeldGate) {
    let _gate = gate;
    let time = clock::uptime_millis();
    let file_exists = state.file_path().exists();

    if state.shared.is_out_of_date() || !file_exists {
        // First instance through the gate builds for everyone.
        let changed = state.source.lock().has_content_changed();
        if changed || !file_exists {
            state.shared.set_last_update_time(time);
            match write_artifact(state) {
                Ok(()) => load_artifact(state),
                Err(err) => {
                    // Keep serving the last valid artifact rather than
                    // swapping in a broken rebuild.
                    tracing::error!(
                        key = %state.filename,
                        error = %err,
                        "rebuild failed, keeping current artifact"
                    );
                }
            }
        } else {
            // Spurious request: nothing actually changed.
            state
                .shared
                .set_last_update_request_time(state.shared.last_update_time());
        }
    } else if state.artifact.lock().is_none()
        || state.local.last_update_time() < state.shared.last_update_time()
    {
        // Another instance already produced a newer shared artifact.
        load_artifact(state);
    }

    // The freshly opened handle is swapped in by a priority task, so the
    // validity check has to queue behind that swap to observe it.
    let validate = Arc::clone(state);
    state
        .lane
        .submit_priority(move || validate_after_reload(&validate, time));
}

/// Trailing validity check. Rebuilds at most once more per reload pass when
/// the swapped-in artifact is corrupt or carries an unsupported version.
fn validate_after_reload(state: &Arc<LexiconState>, time: u64) {
    let needs_rebuild = {
        let artifact = state.artifact.lock();
        match artifact.as_ref() {
            Some(artifact) => {
                !(artifact.is_valid()
                    && state.format.is_supported_version(artifact.format_version()))
            }
            // No handle and no file is a true missing artifact; no handle
            // with an existing file is left for the next reload pass, which
            // loads it without clobbering a peer's data.
            None => !state.file_path().exists(),
        }
    };
    if needs_rebuild {
        tracing::error!(
            key = %state.filename,
            "artifact failed validation after reload, rebuilding"
        );
        state.shared.set_last_update_time(time);
        match write_artifact(state) {
            Ok(()) => load_artifact(state),
            Err(err) => {
                tracing::error!(key = %state.filename, error = %err, "self-heal rebuild failed");
            }
        }
    }
    state.local.set_last_update_time(time);
}

/// Write the artifact file from whichever source of truth this instance
/// carries: the writer (repopulated from source), or the live artifact
/// flushed in place.
fn write_artifact(state: &LexiconState) -> Result<()> {
    tracing::debug!(
        key = %state.filename,
        kind = %state.kind,
        request = state.shared.last_update_request_time(),
        update = state.shared.last_update_time(),
        "writing artifact"
    );
    let needs_source_reload = state.source.lock().needs_reload_before_writing();
    if needs_source_reload {
        let writer = state.writer.as_ref().ok_or_else(|| LexstoreError::SourceLoad {
            detail: format!(
                "{} requires a source reload but carries no writer",
                state.filename
            ),
        })?;
        let mut writer = writer.lock();
        writer.clear();
        state.source.lock().load_into(writer.as_mut())?;
        writer.write(&state.file_path(), &state.header_attributes())?;
        return Ok(());
    }

    let mut artifact = state.artifact.lock();
    let recreate_empty = match artifact.as_ref() {
        Some(artifact) => {
            !artifact.is_valid() || !state.format.is_supported_version(artifact.format_version())
        }
        None => true,
    };
    if recreate_empty {
        drop(artifact);
        let path = state.file_path();
        if path.exists() {
            remove_path(&path)?;
        }
        state
            .format
            .create_empty(&path, state.format.version(), &state.header_attributes())?;
    } else if let Some(artifact) = artifact.as_mut() {
        if artifact.needs_compaction(false) {
            artifact.flush_with_compaction()?;
        } else {
            artifact.flush()?;
        }
    }
    Ok(())
}

/// Open the on-disk artifact and schedule the swap. The swap runs as a
/// priority task so every queued reader of the old handle finishes first;
/// the old handle is closed only after the new one is in place.
fn load_artifact(state: &Arc<LexiconState>) {
    let path = state.open_path();
    let new_artifact = match state.format.open(&path, state.updatable) {
        Ok(artifact) => artifact,
        Err(err) => {
            tracing::error!(
                key = %state.filename,
                path = %path.display(),
                error = %err,
                "failed to open artifact"
            );
            return;
        }
    };
    let swap_state = Arc::clone(state);
    state.lane.submit_priority(move || {
        let mut slot = swap_state.artifact.lock();
        if let Some(mut old) = slot.replace(new_artifact) {
            old.close();
        }
    });
}

/// Compaction policy, evaluated inside the lane: if the artifact wants
/// compaction and the gate is free, a compacting flush runs after currently
/// queued time-sensitive work.
fn compact_if_needed_in_lane(state: &Arc<LexiconState>, can_block: bool) {
    let needs = {
        let artifact = state.artifact.lock();
        artifact
            .as_ref()
            .map(|a| a.needs_compaction(can_block))
            .unwrap_or(false)
    };
    if !needs {
        return;
    }
    if !state.shared.try_begin_large_task() {
        return;
    }
    let gate = HeldGate::new(Arc::clone(&state.shared));
    let gc_state = Arc::clone(state);
    state.lane.submit_priority(move || {
        let _gate = gate;
        let mut artifact = gc_state.artifact.lock();
        if let Some(artifact) = artifact.as_mut() {
            if let Err(err) = artifact.flush_with_compaction() {
                tracing::error!(
                    key = %gc_state.filename,
                    error = %err,
                    "compaction flush failed"
                );
            }
        }
    });
}

fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Conventional filename for a named lexicon in a given locale.
pub fn filename_with_locale(name: &str, locale: &str) -> String {
    format!("{name}.{locale}{DICT_FILE_EXTENSION}")
}

/// Base directory for lexicon files when the embedder does not supply one:
/// `$LEXSTORE_DIR`, else the platform data directory, else a temp fallback.
pub fn default_store_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LEXSTORE_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(data) = dirs::data_local_dir() {
        return data.join("lexstore");
    }
    std::env::temp_dir().join("lexstore")
}
