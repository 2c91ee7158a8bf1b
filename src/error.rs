//! Error types for lexstore operations

use thiserror::Error;

/// Main error type for lexstore operations
#[derive(Error, Debug)]
pub enum LexstoreError {
    #[error("Compiled artifact not found: {path}")]
    ArtifactMissing { path: String },

    #[error("Compiled artifact at {path} failed validation: {detail}")]
    ArtifactCorrupt { path: String, detail: String },

    #[error("Failed to load source content: {detail}")]
    SourceLoad { detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lexstore operations
pub type Result<T> = std::result::Result<T, LexstoreError>;
