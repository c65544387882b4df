//! Renaming tables aside instead of dropping them.

use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::ReconcileResult;
use crate::inspect::Database;

/// Prefix given to archived tables.
pub const OBSOLETE_PREFIX: &str = "_obsolete_";

/// Find a free obsolete name for `table`.
///
/// Tries `_obsolete_<table>`, then `_obsolete_<table>_2`, `_3`, ... so an
/// earlier archive is never overwritten.
pub fn obsolete_name_for<D: Database + ?Sized>(db: &D, table: &str) -> ReconcileResult<String> {
    let base = format!("{}{}", OBSOLETE_PREFIX, table);
    if !db.table_exists(&base)? {
        return Ok(base);
    }

    let mut suffix = 2u32;
    loop {
        let candidate = format!("{}_{}", base, suffix);
        if !db.table_exists(&candidate)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

/// Rename a table with one statement.
pub fn rename_table<D: Database + ?Sized>(db: &D, from: &str, to: &str) -> ReconcileResult<()> {
    let sql = db.dialect().rename_table(from, to);
    debug!(sql = %sql, "Renaming table");
    db.execute(&sql, &[])?;
    Ok(())
}

/// Rename `table` aside to a free obsolete name and return that name.
pub fn archive_table<D: Database + ?Sized>(
    db: &D,
    table: &str,
    diagnostics: &mut Diagnostics,
) -> ReconcileResult<String> {
    let obsolete = obsolete_name_for(db, table)?;
    rename_table(db, table, &obsolete)?;
    diagnostics.changed(
        DiagnosticKind::Archived,
        format!("Archived table '{}' as '{}'", table, obsolete),
    );
    Ok(obsolete)
}
