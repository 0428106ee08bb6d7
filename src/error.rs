//! Error types for trueno-runs
//!
//! Every failure propagates to the immediate caller. Nothing here retries.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trueno-runs error types
#[derive(Error, Debug)]
pub enum Error {
    /// A config/result blob or a run folder does not exist
    #[error("Not found: {}", path.display())]
    NotFound {
        /// Path that was looked for
        path: PathBuf,
    },

    /// Exclusive run folder creation hit an existing folder
    #[error("Run folder already exists: {}\nTwo runs were created within the same timestamp tick", path.display())]
    Collision {
        /// Folder that already existed
        path: PathBuf,
    },

    /// A run folder name that is not a single plain path component
    #[error("Invalid run folder name: '{name}'\nNames must be non-empty and free of path separators, '.' and '..'")]
    InvalidName {
        /// Rejected name
        name: String,
    },

    /// The data hook was opened outside a running procedure
    #[error("No active run context: data files can only be opened while a procedure is executing")]
    NoActiveContext,

    /// The command layer could not bind a configuration
    #[error("Configuration unavailable: {0}")]
    ConfigurationUnavailable(String),

    /// Failure raised by the wrapped procedure, passed through untouched
    #[error(transparent)]
    Procedure(anyhow::Error),

    /// Failure raised by a plot artist or figure backend
    #[error("Plot error in '{artist}': {source}")]
    Plot {
        /// Name of the artist that failed
        artist: String,
        /// Underlying failure
        #[source]
        source: anyhow::Error,
    },

    /// Blob encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Blob decoding failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::NotFound`] for `path`.
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Whether this is the not-found class of error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
