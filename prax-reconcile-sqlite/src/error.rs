//! Error types for the SQLite backend.

use prax_reconcile_core::ReconcileError;
use thiserror::Error;

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SqliteError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<SqliteError> for ReconcileError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Sqlite(e) => ReconcileError::storage(e.to_string()),
            SqliteError::Config(msg) => ReconcileError::config(msg),
        }
    }
}
