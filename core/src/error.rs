//! Error types shared by every stage of building, persisting and querying an index.
//!
//! Per-document failures ([`IndexError::DocumentRead`]) are recovered by the
//! builder. Everything else is fatal for the current operation and is meant to
//! be surfaced to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    /// A single document could not be read or converted to text.
    #[error("failed to read document {doc_id}: {reason}")]
    DocumentRead { doc_id: String, reason: String },

    /// The persisted index exists but cannot be parsed or fails validation.
    #[error("corrupt index at {}: {reason}", path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    /// No usable index exists and none could be built.
    #[error("index unavailable at {}: {reason}", path.display())]
    IndexUnavailable { path: PathBuf, reason: String },

    /// The corpus manifest is missing or malformed.
    #[error("manifest error at {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl IndexError {
    pub fn document_read<S: Into<String>, R: ToString>(doc_id: S, reason: R) -> Self {
        IndexError::DocumentRead { doc_id: doc_id.into(), reason: reason.to_string() }
    }

    pub fn corrupt<P: Into<PathBuf>, R: ToString>(path: P, reason: R) -> Self {
        IndexError::CorruptIndex { path: path.into(), reason: reason.to_string() }
    }

    pub fn unavailable<P: Into<PathBuf>, R: ToString>(path: P, reason: R) -> Self {
        IndexError::IndexUnavailable { path: path.into(), reason: reason.to_string() }
    }

    pub fn manifest<P: Into<PathBuf>, R: ToString>(path: P, reason: R) -> Self {
        IndexError::Manifest { path: path.into(), reason: reason.to_string() }
    }

    /// True for the error kinds the builder absorbs instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IndexError::DocumentRead { .. })
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
