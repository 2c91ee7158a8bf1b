//! Common test utilities and fixtures for lexstore integration tests
//!
//! This module provides:
//! - A JSON-backed stub artifact format (`JsonFormat`) with instrumentation
//!   counters, so tests can assert how often the store wrote, opened,
//!   flushed and compacted
//! - A scriptable `LexiconSource` whose "has the content changed" answer and
//!   content the test controls
//! - A `Fixture` builder wiring the above to an `ExpandableLexicon` on a
//!   `tempfile::TempDir`

#![allow(dead_code)]

use std::sync::Once;

pub mod format;

pub use fixtures::Fixture;
pub use format::{FormatStats, JsonFormat, JsonWriter, LexiconFile, ScriptedSource};

static TRACING: Once = Once::new();

/// Route store logs through a subscriber honoring `RUST_LOG`, once per test
/// binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
