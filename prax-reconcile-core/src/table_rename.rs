//! Table renames.
//!
//! Each rule is decided from a fresh look at the schema:
//!
//! | old exists | new exists | new rows | action                               |
//! |------------|------------|----------|--------------------------------------|
//! | no         | -          | -        | skip                                 |
//! | yes        | no         | -        | rename old to new                    |
//! | yes        | yes        | 0        | archive new, then rename old to new  |
//! | yes        | yes        | > 0      | refuse, report for manual resolution |

use tracing::debug;

use crate::archive::{archive_table, rename_table};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::ReconcileResult;
use crate::inspect::Database;
use crate::rules::TableRenameRule;

/// Outcome of a single table rename rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRenameOutcome {
    /// The old table does not exist.
    NothingToDo,
    /// The old table was renamed.
    Renamed,
    /// An empty new table was archived and the old table took its name.
    RenamedOverEmpty {
        /// Where the empty table was archived to.
        archived_as: String,
    },
    /// Both tables hold data.
    ManualResolutionRequired {
        /// Rows in the new table.
        new_rows: u64,
    },
}

impl TableRenameOutcome {
    /// Check if the rule renamed a table.
    pub fn is_renamed(&self) -> bool {
        matches!(self, Self::Renamed | Self::RenamedOverEmpty { .. })
    }
}

/// Resolves table-level naming drift.
pub struct TableRenamer<'db, D: Database + ?Sized> {
    db: &'db D,
}

impl<'db, D: Database + ?Sized> TableRenamer<'db, D> {
    /// Create a renamer over a database.
    pub fn new(db: &'db D) -> Self {
        Self { db }
    }

    /// Apply every rule and return the number of tables renamed.
    ///
    /// A rule that needs manual resolution is reported and skipped; it never
    /// fails the run.
    pub fn apply(
        &self,
        rules: &[TableRenameRule],
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<usize> {
        let mut renamed = 0;
        for rule in rules {
            if self.apply_one(rule, diagnostics)?.is_renamed() {
                renamed += 1;
            }
        }

        if renamed > 0 {
            diagnostics.notice(
                DiagnosticKind::Renamed,
                format!("Renamed {} table(s)", renamed),
            );
        }
        Ok(renamed)
    }

    /// Apply a single rule.
    pub fn apply_one(
        &self,
        rule: &TableRenameRule,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<TableRenameOutcome> {
        let old = rule.old_name.as_str();
        let new = rule.new_name.as_str();

        if old == new || !self.db.table_exists(old)? {
            debug!(old, new, "Nothing to rename");
            return Ok(TableRenameOutcome::NothingToDo);
        }

        if !self.db.table_exists(new)? {
            rename_table(self.db, old, new)?;
            diagnostics.changed(
                DiagnosticKind::Renamed,
                format!("Renamed table '{}' to '{}'", old, new),
            );
            return Ok(TableRenameOutcome::Renamed);
        }

        let new_rows = self.db.row_count(new)?;
        if new_rows > 0 {
            diagnostics.error(
                DiagnosticKind::ManualResolutionRequired,
                format!(
                    "Cannot rename '{}' to '{}': both tables exist and '{}' holds {} row(s). \
                     Resolve manually.",
                    old, new, new, new_rows
                ),
            );
            return Ok(TableRenameOutcome::ManualResolutionRequired { new_rows });
        }

        let archived_as = archive_table(self.db, new, diagnostics)?;
        rename_table(self.db, old, new)?;
        diagnostics.changed(
            DiagnosticKind::Renamed,
            format!("Renamed table '{}' to '{}'", old, new),
        );
        Ok(TableRenameOutcome::RenamedOverEmpty { archived_as })
    }
}
