//! JSON-backed stub artifact format.
//!
//! Exists only to exercise the coordinator: a lexicon file is a pretty-
//! printed JSON document holding unigrams, bigrams, header attributes and a
//! dead-entry counter that drives the compaction policy. Scoring is
//! deliberately naive.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use lexstore::{
    ArtifactFormat, BatchEntry, BigramEntry, CompiledArtifact, HeaderAttributes, LexiconSource,
    LexiconWriter, LexstoreError, LookupRequest, Result, Suggestion, UnigramEntry,
};

/// Counters shared between a format and everything it opens, so tests can
/// assert what the store did and that large tasks never overlapped.
#[derive(Default)]
pub struct FormatStats {
    /// Artifact file writes: `create_empty` plus writer serializations.
    pub writes: AtomicUsize,
    pub opens: AtomicUsize,
    pub flushes: AtomicUsize,
    pub compactions: AtomicUsize,
    /// Source loads (rebuilds that went back to the content feed).
    pub loads: AtomicUsize,
    active_large: AtomicUsize,
    max_active_large: AtomicUsize,
}

impl FormatStats {
    pub fn enter_large(&self) {
        let now = self.active_large.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_large.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit_large(&self) {
        self.active_large.fetch_sub(1, Ordering::SeqCst);
    }

    /// Highest number of large operations ever observed running at once.
    pub fn max_active_large(&self) -> usize {
        self.max_active_large.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn compactions(&self) -> usize {
        self.compactions.load(Ordering::SeqCst)
    }
}

/// On-disk document of the stub format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconFile {
    pub version: u32,
    pub attributes: HeaderAttributes,
    pub unigrams: BTreeMap<String, i32>,
    /// Keyed by `"{prev}\t{word}"`.
    pub bigrams: BTreeMap<String, i32>,
    /// Overwritten/removed entries awaiting compaction.
    pub dead: u32,
}

fn bigram_key(prev_word: &str, word: &str) -> String {
    format!("{prev_word}\t{word}")
}

/// Stub [`ArtifactFormat`]. Parse failures open as an *invalid* artifact
/// rather than failing, so the store's validate-then-self-heal path is the
/// one that deals with corruption.
pub struct JsonFormat {
    pub version: u32,
    pub compaction_threshold: u32,
    pub stats: Arc<FormatStats>,
}

impl JsonFormat {
    pub fn new() -> Self {
        Self {
            version: 4,
            compaction_threshold: 3,
            stats: Arc::new(FormatStats::default()),
        }
    }
}

impl ArtifactFormat for JsonFormat {
    fn open(&self, path: &Path, updatable: bool) -> Result<Box<dyn CompiledArtifact>> {
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        let bytes = std::fs::read(path).map_err(|_| LexstoreError::ArtifactMissing {
            path: path.display().to_string(),
        })?;
        let (data, valid) = match serde_json::from_slice::<LexiconFile>(&bytes) {
            Ok(data) => (data, true),
            Err(_) => (LexiconFile::default(), false),
        };
        Ok(Box::new(JsonArtifact {
            path: path.to_path_buf(),
            data,
            valid,
            updatable,
            compaction_threshold: self.compaction_threshold,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn create_empty(
        &self,
        path: &Path,
        version: u32,
        attributes: &HeaderAttributes,
    ) -> Result<()> {
        let data = LexiconFile {
            version,
            attributes: attributes.clone(),
            ..LexiconFile::default()
        };
        write_document(path, &data)?;
        self.stats.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn version(&self) -> u32 {
        self.version
    }
}

fn write_document(path: &Path, data: &LexiconFile) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(data).map_err(io::Error::from)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

struct JsonArtifact {
    path: PathBuf,
    data: LexiconFile,
    valid: bool,
    updatable: bool,
    compaction_threshold: u32,
    stats: Arc<FormatStats>,
}

impl JsonArtifact {
    fn persist(&mut self) -> Result<()> {
        write_document(&self.path, &self.data)
    }
}

impl CompiledArtifact for JsonArtifact {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn format_version(&self) -> u32 {
        self.data.version
    }

    fn suggestions(&self, request: &LookupRequest) -> Result<Vec<Suggestion>> {
        if !self.valid {
            return Err(LexstoreError::ArtifactCorrupt {
                path: self.path.display().to_string(),
                detail: "artifact failed integrity check".to_string(),
            });
        }
        let mut results: Vec<Suggestion> = self
            .data
            .unigrams
            .iter()
            .filter(|(word, _)| word.starts_with(&request.composed))
            .map(|(word, frequency)| {
                let bonus = request
                    .prev_word
                    .as_deref()
                    .and_then(|prev| self.data.bigrams.get(&bigram_key(prev, word)))
                    .copied()
                    .unwrap_or(0);
                Suggestion {
                    word: word.clone(),
                    score: frequency + bonus,
                }
            })
            .collect();
        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.word.cmp(&b.word)));
        results.truncate(request.limit);
        Ok(results)
    }

    fn contains(&self, word: &str) -> bool {
        self.valid && self.data.unigrams.contains_key(word)
    }

    fn contains_bigram(&self, prev_word: &str, word: &str) -> bool {
        self.valid && self.data.bigrams.contains_key(&bigram_key(prev_word, word))
    }

    fn add_unigram(&mut self, entry: &UnigramEntry) -> Result<()> {
        if self
            .data
            .unigrams
            .insert(entry.word.clone(), entry.frequency)
            .is_some()
        {
            self.data.dead += 1;
        }
        Ok(())
    }

    fn add_bigram(&mut self, entry: &BigramEntry) -> Result<()> {
        if self
            .data
            .bigrams
            .insert(bigram_key(&entry.prev_word, &entry.word), entry.frequency)
            .is_some()
        {
            self.data.dead += 1;
        }
        Ok(())
    }

    fn remove_bigram(&mut self, prev_word: &str, word: &str) -> Result<()> {
        if self
            .data
            .bigrams
            .remove(&bigram_key(prev_word, word))
            .is_some()
        {
            self.data.dead += 1;
        }
        Ok(())
    }

    fn add_entries(&mut self, entries: &[BatchEntry]) -> Result<()> {
        self.stats.enter_large();
        thread::sleep(Duration::from_millis(2));
        for entry in entries {
            match &entry.prev_word {
                Some(prev) => {
                    self.data
                        .bigrams
                        .insert(bigram_key(prev, &entry.word), entry.frequency);
                }
                None => {
                    self.data.unigrams.insert(entry.word.clone(), entry.frequency);
                }
            }
        }
        let result = self.persist();
        self.stats.exit_large();
        result
    }

    fn needs_compaction(&self, _can_block: bool) -> bool {
        self.data.dead >= self.compaction_threshold
    }

    fn flush(&mut self) -> Result<()> {
        self.stats.flushes.fetch_add(1, Ordering::SeqCst);
        self.persist()
    }

    fn flush_with_compaction(&mut self) -> Result<()> {
        self.stats.enter_large();
        thread::sleep(Duration::from_millis(2));
        self.data.dead = 0;
        let result = self.persist();
        self.stats.compactions.fetch_add(1, Ordering::SeqCst);
        self.stats.exit_large();
        result
    }

    fn close(&mut self) {
        self.valid = false;
    }
}

/// Stub [`LexiconWriter`] accumulating entries in memory and serializing
/// them as a fresh stub document.
pub struct JsonWriter {
    version: u32,
    unigrams: Vec<UnigramEntry>,
    bigrams: Vec<BigramEntry>,
    stats: Arc<FormatStats>,
}

impl JsonWriter {
    pub fn new(format: &JsonFormat) -> Self {
        Self {
            version: format.version,
            unigrams: Vec::new(),
            bigrams: Vec::new(),
            stats: Arc::clone(&format.stats),
        }
    }
}

impl LexiconWriter for JsonWriter {
    fn add_unigram(&mut self, entry: UnigramEntry) {
        self.unigrams.push(entry);
    }

    fn add_bigram(&mut self, entry: BigramEntry) {
        self.bigrams.push(entry);
    }

    fn clear(&mut self) {
        self.unigrams.clear();
        self.bigrams.clear();
    }

    fn write(&mut self, path: &Path, attributes: &HeaderAttributes) -> Result<()> {
        let mut data = LexiconFile {
            version: self.version,
            attributes: attributes.clone(),
            ..LexiconFile::default()
        };
        for entry in &self.unigrams {
            data.unigrams.insert(entry.word.clone(), entry.frequency);
        }
        for entry in &self.bigrams {
            data.bigrams
                .insert(bigram_key(&entry.prev_word, &entry.word), entry.frequency);
        }
        write_document(path, &data)?;
        self.stats.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scriptable [`LexiconSource`]: the test decides what the content is and
/// whether it counts as changed. Loading flips `changed` back off, the way
/// a real feed is consumed by a rebuild.
pub struct ScriptedSource {
    pub changed: Arc<AtomicBool>,
    pub content: Arc<Mutex<Vec<(String, i32)>>>,
    pub reload_before_writing: bool,
    pub load_delay: Duration,
    /// While set, every load attempt fails without consuming `changed`.
    pub fail_loads: Arc<AtomicBool>,
    pub stats: Arc<FormatStats>,
}

impl LexiconSource for ScriptedSource {
    fn has_content_changed(&mut self) -> bool {
        self.changed.load(Ordering::SeqCst)
    }

    fn needs_reload_before_writing(&self) -> bool {
        self.reload_before_writing
    }

    fn load_into(&mut self, writer: &mut dyn LexiconWriter) -> Result<()> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(LexstoreError::SourceLoad {
                detail: "content feed unavailable".to_string(),
            });
        }
        self.stats.enter_large();
        thread::sleep(self.load_delay);
        for (word, frequency) in self.content.lock().iter() {
            writer.add_unigram(UnigramEntry::new(word.clone(), *frequency));
        }
        self.stats.loads.fetch_add(1, Ordering::SeqCst);
        self.changed.store(false, Ordering::SeqCst);
        self.stats.exit_large();
        Ok(())
    }
}
