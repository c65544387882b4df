//! Leveled diagnostic stream produced by every reconciliation stage.
//!
//! Each message is recorded in order for the host to surface verbatim and is
//! mirrored to `tracing` as it is pushed.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Informational, nothing changed.
    Notice,
    /// The schema or its data was modified.
    Changed,
    /// Automatic resolution was refused.
    Error,
}

impl DiagnosticLevel {
    /// Get the lowercase label for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Changed => "changed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The rule found nothing to do.
    NothingToDo,
    /// Discriminator remaps were handed to the host.
    Published,
    /// A table or column was renamed.
    Renamed,
    /// A table was renamed aside to an obsolete name.
    Archived,
    /// Rows were migrated from one table into another.
    Merged,
    /// A merge target does not exist yet.
    ConfigurationGap,
    /// Both sides of a rename hold data.
    ManualResolutionRequired,
    /// A merge source and target share no columns.
    SchemaIncompatibility,
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Category.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to `tracing`.
    pub fn push(
        &mut self,
        level: DiagnosticLevel,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        let message = message.into();
        match level {
            DiagnosticLevel::Error => error!(kind = ?kind, "{}", message),
            DiagnosticLevel::Changed => info!(kind = ?kind, changed = true, "{}", message),
            DiagnosticLevel::Notice => info!(kind = ?kind, "{}", message),
        }
        self.entries.push(Diagnostic {
            level,
            kind,
            message,
        });
    }

    /// Record a notice.
    pub fn notice(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(DiagnosticLevel::Notice, kind, message);
    }

    /// Record a change.
    pub fn changed(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(DiagnosticLevel::Changed, kind, message);
    }

    /// Record an error.
    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(DiagnosticLevel::Error, kind, message);
    }

    /// Count diagnostics at a given level.
    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.entries.iter().filter(|d| d.level == level).count()
    }

    /// Count diagnostics of a given kind.
    pub fn count_kind(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Check if any error-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.count(DiagnosticLevel::Error) > 0
    }

    /// Iterate over the recorded diagnostics in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the collection.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
