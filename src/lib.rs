//! lexstore: shared compiled-lexicon store with coordinated background
//! rebuilds.
//!
//! A lexicon's queryable form is a compiled artifact on disk, derived from a
//! slower-changing source of truth (an in-memory writer or an external
//! content feed). Several logical dictionary instances may share one
//! artifact file; this crate coordinates them so that exactly one rebuild,
//! compaction or bulk write runs against a file at a time while
//! latency-sensitive reads keep getting answered within a hard deadline.
//!
//! The moving parts:
//!
//! - a process-wide [`registry::LexiconRegistry`] handing every instance of
//!   a filename the same [`controller::UpdateController`] (staleness record
//!   + large-task gate) and [`lane::SerialLane`] (single-worker prioritized
//!   task queue);
//! - [`lexicon::ExpandableLexicon`], the per-instance façade running the
//!   reload/build pipeline, the bounded read path and the compaction policy
//!   on that shared lane;
//! - collaborator contracts in [`artifact`] and [`writer`]: the store
//!   treats the on-disk layout, scoring and serialization as someone else's
//!   problem.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lexstore::{ExpandableLexicon, LookupRequest, filename_with_locale};
//!
//! let lexicon = ExpandableLexicon::new(
//!     lexstore::default_store_dir(),
//!     filename_with_locale("user", "en_US"),
//!     "en_US",
//!     "user",
//!     false,
//!     Box::new(my_source),
//!     Some(Box::new(my_writer)),
//!     Arc::new(my_format),
//! );
//! lexicon.load_if_needed();
//! let words = lexicon.suggestions(&LookupRequest::new("hel"));
//! ```

pub mod artifact;
pub mod clock;
pub mod controller;
pub mod error;
pub mod holder;
pub mod lane;
pub mod lexicon;
pub mod registry;
pub mod writer;

// Re-export commonly used types
pub use artifact::{
    ArtifactFormat, BatchEntry, BigramEntry, CompiledArtifact, HeaderAttributes, LookupRequest,
    Suggestion, UnigramEntry, KEY_ID, KEY_LOCALE, KEY_VERSION,
};
pub use controller::{HeldGate, UpdateController};
pub use error::{LexstoreError, Result};
pub use holder::ResultSlot;
pub use lane::{SerialLane, TaskHandle};
pub use lexicon::{
    default_store_dir, filename_with_locale, ExpandableLexicon, LexiconOptions, LexiconSource,
    DICT_FILE_EXTENSION,
};
pub use registry::LexiconRegistry;
pub use writer::LexiconWriter;
