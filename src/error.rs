//! # Error types for tldr
//!
//! Core modules (cache, index, finder) return [`TldrError`]. Command modules
//! wrap these in `anyhow` with context, the CLI maps them to exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::download::DownloadError;

/// Errors surfaced by the page resolution engine.
#[derive(Debug, Error)]
pub enum TldrError {
    /// The network or the page service could not be reached, or errored.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Reading or writing the local cache tree failed.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bulk pages archive could not be read or extracted.
    #[error("Invalid pages archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The command manifest or the stored index is not valid JSON.
    #[error("Invalid index data: {0}")]
    Index(#[from] serde_json::Error),

    /// The resolved configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TldrError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TldrError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, TldrError>;
