use repodex_schema::{HashError, RecordError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a repository.
///
/// Nothing in the pipeline retries: every variant surfaces to the caller,
/// which decides whether to abort the run.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A payload, record file or config file could not be (de)serialized.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An existence check, read or write failed.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A resolved include filename would land outside the output directory.
    #[error("Include filename '{0}' escapes the output directory")]
    UnsafeFilename(String),

    /// A dumped record is missing required attributes.
    #[error("Invalid record #{index}: {source}")]
    InvalidRecord {
        /// Position of the record in the input.
        index: usize,
        /// What is wrong with it.
        #[source]
        source: RecordError,
    },

    /// An unsupported hash algorithm was requested.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl BuildError {
    /// Attach the offending path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the core crate.
pub type Result<T, E = BuildError> = std::result::Result<T, E>;
