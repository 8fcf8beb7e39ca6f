// src/error.rs
//! Error types for the homophone engine.
//!
//! Malformed dictionary lines and underfilled multi-result conversions are
//! not errors; they are absorbed and only show up in statistics or in a
//! shorter result list.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HomophoneError {
    /// A dictionary source could not be read at all.
    #[error("dictionary source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A conversion request was rejected before any substitution work.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Enumeration would exceed the configured ceiling. A `count` of
    /// `u128::MAX` means the product overflowed.
    #[error("enumeration would produce {count} combinations (limit {limit})")]
    TooManyCombinations { count: u128, limit: u64 },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, HomophoneError>;

impl HomophoneError {
    pub fn source_unavailable<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        HomophoneError::SourceUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        HomophoneError::InvalidInput(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        HomophoneError::Config(msg.into())
    }

    /// Stable name of the failure kind, for collaborators that report errors
    /// over a wire format.
    pub fn kind(&self) -> &'static str {
        match self {
            HomophoneError::SourceUnavailable { .. } => "source_unavailable",
            HomophoneError::InvalidInput(_) => "invalid_input",
            HomophoneError::TooManyCombinations { .. } => "too_many_combinations",
            HomophoneError::Snapshot(_) => "snapshot",
            HomophoneError::Config(_) => "config",
            HomophoneError::Json(_) => "json",
            HomophoneError::Io(_) => "io",
        }
    }
}
