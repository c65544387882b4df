//! Column renames within existing tables.

use indexmap::IndexMap;
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::ReconcileResult;
use crate::inspect::{ColumnInfo, Database, find_column_ci};
use crate::rules::ColumnRenameRule;

/// Resolves column-level naming drift.
pub struct ColumnRenamer<'db, D: Database + ?Sized> {
    db: &'db D,
}

impl<'db, D: Database + ?Sized> ColumnRenamer<'db, D> {
    /// Create a renamer over a database.
    pub fn new(db: &'db D) -> Self {
        Self { db }
    }

    /// Apply every rule, grouped by table, and return the number of columns
    /// renamed.
    pub fn apply(
        &self,
        rules_by_table: &IndexMap<String, Vec<ColumnRenameRule>>,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<usize> {
        let mut renamed = 0;
        for (table, rules) in rules_by_table {
            renamed += self.apply_table(table, rules, diagnostics)?;
        }

        if renamed > 0 {
            diagnostics.notice(
                DiagnosticKind::Renamed,
                format!("Renamed {} column(s)", renamed),
            );
        }
        Ok(renamed)
    }

    /// Apply the rules for one table.
    pub fn apply_table(
        &self,
        table: &str,
        rules: &[ColumnRenameRule],
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<usize> {
        if !self.db.table_exists(table)? {
            debug!(table, "Table absent, skipping column renames");
            return Ok(0);
        }

        let dialect = self.db.dialect();
        let mut columns = self.db.list_columns(table)?;
        let mut renamed = 0;

        for rule in rules {
            let old = rule.old_column.as_str();
            let new = rule.new_column.as_str();

            // Column names compare case-insensitively, as SQL does.
            let Some(info) = find_column_ci(&columns, old)
                .and_then(|name| columns.get(name))
                .cloned()
            else {
                debug!(table, old, "Column absent, nothing to rename");
                continue;
            };
            let stored = info.name.clone();
            if stored == new {
                continue;
            }
            if find_column_ci(&columns, new).is_some_and(|existing| existing != stored) {
                debug!(table, old, new, "Target column already present");
                continue;
            }

            let sql = dialect.rename_column(table, &info, new);
            debug!(sql = %sql, "Renaming column");
            self.db.execute(&sql, &[])?;

            // Later rules on this table see the new name.
            columns.shift_remove(&stored);
            columns.insert(
                new.to_string(),
                ColumnInfo {
                    name: new.to_string(),
                    ..info
                },
            );

            diagnostics.changed(
                DiagnosticKind::Renamed,
                format!("Renamed column '{}.{}' to '{}'", table, stored, new),
            );
            renamed += 1;
        }

        Ok(renamed)
    }
}
