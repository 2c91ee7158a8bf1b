//! Collaborator contracts for the compiled artifact and its on-disk format.
//!
//! The store never looks inside an artifact file. Everything format-specific
//! (binary layout, scoring, compaction bookkeeping) lives behind
//! [`ArtifactFormat`] and [`CompiledArtifact`]; the store only decides *when*
//! to open, rebuild, flush, compact, and close, and on which lane that
//! happens.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Header attribute key for the lexicon identifier (the filename key).
pub const KEY_ID: &str = "dictionary";

/// Header attribute key for the lexicon locale.
pub const KEY_LOCALE: &str = "locale";

/// Header attribute key for the generation timestamp, in seconds since the
/// Unix epoch.
pub const KEY_VERSION: &str = "version";

/// Key/value attributes written into an artifact's header at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderAttributes(BTreeMap<String, String>);

impl HeaderAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single word with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnigramEntry {
    pub word: String,
    pub frequency: i32,
    /// Target this word is a shortcut for, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut_target: Option<String>,
    /// Shortcut frequency (0-15, 15 meaning whitelisted). Ignored without a
    /// shortcut target.
    pub shortcut_frequency: i32,
    /// Shortcut-only entry, not a word in its own right.
    pub is_not_a_word: bool,
    pub is_blacklisted: bool,
    /// When the entry was recorded (Unix seconds), for decay policies.
    pub timestamp: u64,
}

impl UnigramEntry {
    pub fn new(word: impl Into<String>, frequency: i32) -> Self {
        Self {
            word: word.into(),
            frequency,
            shortcut_target: None,
            shortcut_frequency: 0,
            is_not_a_word: false,
            is_blacklisted: false,
            timestamp: 0,
        }
    }
}

/// A word pair with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramEntry {
    pub prev_word: String,
    pub word: String,
    pub frequency: i32,
    pub timestamp: u64,
}

impl BigramEntry {
    pub fn new(prev_word: impl Into<String>, word: impl Into<String>, frequency: i32) -> Self {
        Self {
            prev_word: prev_word.into(),
            word: word.into(),
            frequency,
            timestamp: 0,
        }
    }
}

/// One element of a bulk insert: a unigram, or a bigram when `prev_word` is
/// present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_word: Option<String>,
    pub word: String,
    pub frequency: i32,
    pub timestamp: u64,
}

/// A read query against the compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// The composed (partial) word being typed.
    pub composed: String,
    /// Previous committed word, for bigram-weighted results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_word: Option<String>,
    /// Maximum number of suggestions to produce.
    pub limit: usize,
}

impl LookupRequest {
    pub fn new(composed: impl Into<String>) -> Self {
        Self {
            composed: composed.into(),
            prev_word: None,
            limit: 18,
        }
    }

    pub fn with_prev_word(mut self, prev_word: impl Into<String>) -> Self {
        self.prev_word = Some(prev_word.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A scored answer to a [`LookupRequest`]. Scoring quality is entirely the
/// format's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub word: String,
    pub score: i32,
}

/// Factory for a concrete on-disk artifact layout.
pub trait ArtifactFormat: Send + Sync {
    /// Open an existing artifact file for querying, and for in-place
    /// mutation when `updatable`.
    fn open(&self, path: &Path, updatable: bool) -> Result<Box<dyn CompiledArtifact>>;

    /// Create a new, empty, valid artifact at `path`.
    fn create_empty(&self, path: &Path, version: u32, attributes: &HeaderAttributes)
        -> Result<()>;

    /// Format version stamped into newly created artifacts.
    fn version(&self) -> u32;

    /// Whether an artifact carrying `version` can be served by this format.
    fn is_supported_version(&self, version: u32) -> bool {
        version == self.version()
    }

    /// Extension appended to the key to obtain the openable file, for
    /// layouts where the key names a directory rather than a flat file.
    fn open_extension(&self) -> &str {
        ""
    }
}

/// An opened, queryable artifact.
///
/// Handles are owned by one lexicon instance but replaced and closed only
/// from that key's task lane; lane serialization is what makes the
/// swap-and-close race-free without further locking.
pub trait CompiledArtifact: Send {
    /// Whether the underlying file passed the format's integrity check.
    fn is_valid(&self) -> bool;

    fn format_version(&self) -> u32;

    fn suggestions(&self, request: &LookupRequest) -> Result<Vec<Suggestion>>;

    fn contains(&self, word: &str) -> bool;

    fn contains_bigram(&self, prev_word: &str, word: &str) -> bool;

    fn add_unigram(&mut self, entry: &UnigramEntry) -> Result<()>;

    fn add_bigram(&mut self, entry: &BigramEntry) -> Result<()>;

    fn remove_bigram(&mut self, prev_word: &str, word: &str) -> Result<()>;

    fn add_entries(&mut self, entries: &[BatchEntry]) -> Result<()>;

    /// Whether compaction should run before more entries are added.
    /// `can_block` is true on mutation paths that tolerate a short stall and
    /// false for the eager pre-check at rebuild time.
    fn needs_compaction(&self, can_block: bool) -> bool;

    /// Persist pending entries without reorganizing storage.
    fn flush(&mut self) -> Result<()>;

    /// Persist pending entries and reclaim storage.
    fn flush_with_compaction(&mut self) -> Result<()>;

    /// Release resources. Called at most once, from a lane task.
    fn close(&mut self);
}
