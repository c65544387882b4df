//! Error types for the reconciliation engine.

use thiserror::Error;

/// Result type alias for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that abort a reconciliation run.
///
/// Conflicts that need a human (a rename target holding data, a merge target
/// that does not exist yet, no overlapping columns) are not errors. They are
/// reported as [`Diagnostic`](crate::diagnostics::Diagnostic)s and the
/// offending rule is skipped.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A statement or introspection query failed at the storage layer.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A rule failed validation.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// The rule file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconcileError {
    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid rule error.
    pub fn invalid_rule(msg: impl Into<String>) -> Self {
        Self::InvalidRule(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error came from the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
