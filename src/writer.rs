//! In-memory source-of-truth representation used to (re)build an artifact.
//!
//! Instances that regenerate their content from an external source carry a
//! writer; during a rebuild the source repopulates it and the writer
//! serializes itself to a fresh artifact file. Instances that only mutate a
//! pre-built artifact in place carry none.

use std::path::Path;

use crate::artifact::{BigramEntry, HeaderAttributes, UnigramEntry};
use crate::error::Result;

/// Mutable in-memory lexicon content, exclusively owned by one instance and
/// touched only from that key's task lane.
pub trait LexiconWriter: Send {
    fn add_unigram(&mut self, entry: UnigramEntry);

    fn add_bigram(&mut self, entry: BigramEntry);

    /// Discard all content. A cleared writer still serializes to a valid,
    /// empty artifact.
    fn clear(&mut self);

    /// Serialize current content to a new artifact file at `path`.
    fn write(&mut self, path: &Path, attributes: &HeaderAttributes) -> Result<()>;
}
