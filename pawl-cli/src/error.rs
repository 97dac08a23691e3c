//! CLI error types and result alias.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Failure establishing the database connection
    #[error("connection error: {0}")]
    #[diagnostic(code(pawl::connection))]
    Connection(#[from] tokio_postgres::Error),

    /// Failure inside the reconciliation engine
    #[error(transparent)]
    #[diagnostic(code(pawl::engine))]
    Engine(#[from] pawl_engine::EngineError),
}
