//! Error types for the change engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while reconciling and applying change files.
#[derive(Debug, Error)]
pub enum EngineError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No change files under the search root.
    #[error("no change files found under {}", .0.display())]
    NoChangeFiles(PathBuf),

    /// A previously applied file has different content on disk.
    #[error(
        "change file '{path}' has been modified: fingerprint {actual}, ledger recorded {expected}"
    )]
    Drift {
        /// Path as recorded in the ledger.
        path: String,
        /// Fingerprint the ledger recorded when the file was applied.
        expected: String,
        /// Fingerprint of the file on disk now.
        actual: String,
    },

    /// Content that is already in the ledger reappeared under a new path.
    #[error("change file '{path}' has already been applied from '{original}'")]
    DuplicateContent {
        /// Path of the newly discovered file.
        path: String,
        /// Path the same content was applied from.
        original: String,
    },

    /// A change file could not be turned into statements.
    #[error("cannot translate '{}': {message}", .path.display())]
    Translation {
        /// Path of the offending file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A statement failed against the database.
    #[error("execution failed for '{}': {source}", .path.display())]
    Execution {
        /// Path of the file whose statement failed.
        path: PathBuf,
        /// The underlying database error.
        #[source]
        source: tokio_postgres::Error,
    },

    /// Ledger or transaction round trip failed.
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
}

impl EngineError {
    /// Create a translation error.
    pub fn translation(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Translation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an execution error.
    pub fn execution(path: impl Into<PathBuf>, source: tokio_postgres::Error) -> Self {
        Self::Execution {
            path: path.into(),
            source,
        }
    }

    /// Check whether this error was raised before anything could execute.
    pub fn is_planning_error(&self) -> bool {
        matches!(
            self,
            Self::NoChangeFiles(_) | Self::Drift { .. } | Self::DuplicateContent { .. }
        )
    }
}
