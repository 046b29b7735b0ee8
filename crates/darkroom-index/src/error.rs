use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// A record with this filename is already present.
    #[error("duplicate filename in index: {0}")]
    DuplicateKey(String),

    /// No record matches the given filename or event.
    #[error("not found in index: {0}")]
    NotFound(String),

    /// The snapshot on disk cannot be parsed into a valid table.
    #[error("corrupt index at {path}: {reason}")]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("failed to encode index snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),
}
