//! In-memory stand-in for a database, for unit tests.
//!
//! Tracks table names, column names and row counts. Table and column renames
//! are applied; every other statement is only recorded.

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::dialect::Dialect;
use crate::error::{ReconcileError, ReconcileResult};
use crate::inspect::{ColumnInfo, ColumnMap, SchemaInspector, StatementExecutor};

#[derive(Debug, Clone)]
struct FakeTable {
    columns: ColumnMap,
    rows: u64,
}

#[derive(Debug, Default)]
pub(crate) struct FakeDatabase {
    tables: RefCell<IndexMap<String, FakeTable>>,
    executed: RefCell<Vec<String>>,
}

impl FakeDatabase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn table(self, name: &str, columns: &[&str], rows: u64) -> Self {
        let columns = columns
            .iter()
            .map(|c| (c.to_string(), ColumnInfo::new(*c, "TEXT")))
            .collect();
        self.tables
            .borrow_mut()
            .insert(name.to_string(), FakeTable { columns, rows });
        self
    }

    pub(crate) fn has_table(&self, name: &str) -> bool {
        self.tables.borrow().contains_key(name)
    }

    pub(crate) fn rows(&self, name: &str) -> u64 {
        self.tables.borrow().get(name).map(|t| t.rows).unwrap_or(0)
    }

    pub(crate) fn columns(&self, name: &str) -> Vec<String> {
        self.tables
            .borrow()
            .get(name)
            .map(|t| t.columns.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

/// Pull every double-quoted identifier out of a statement.
fn quoted_idents(sql: &str) -> Vec<String> {
    sql.split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.to_string())
        .collect()
}

impl SchemaInspector for FakeDatabase {
    fn table_exists(&self, table: &str) -> ReconcileResult<bool> {
        Ok(self.has_table(table))
    }

    fn list_columns(&self, table: &str) -> ReconcileResult<ColumnMap> {
        Ok(self
            .tables
            .borrow()
            .get(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    fn row_count(&self, table: &str) -> ReconcileResult<u64> {
        self.tables
            .borrow()
            .get(table)
            .map(|t| t.rows)
            .ok_or_else(|| ReconcileError::storage(format!("no such table: {}", table)))
    }
}

impl StatementExecutor for FakeDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&self, sql: &str, _params: &[&str]) -> ReconcileResult<u64> {
        self.executed.borrow_mut().push(sql.to_string());
        let idents = quoted_idents(sql);

        if sql.contains(" RENAME COLUMN ") {
            let mut tables = self.tables.borrow_mut();
            let table = tables
                .get_mut(&idents[0])
                .ok_or_else(|| ReconcileError::storage(format!("no such table: {}", idents[0])))?;
            let info = table
                .columns
                .shift_remove(&idents[1])
                .ok_or_else(|| ReconcileError::storage(format!("no such column: {}", idents[1])))?;
            table
                .columns
                .insert(idents[2].clone(), ColumnInfo { name: idents[2].clone(), ..info });
        } else if sql.contains(" RENAME TO ") {
            let mut tables = self.tables.borrow_mut();
            if tables.contains_key(&idents[1]) {
                return Err(ReconcileError::storage(format!(
                    "there is already another table named {}",
                    idents[1]
                )));
            }
            let table = tables
                .shift_remove(&idents[0])
                .ok_or_else(|| ReconcileError::storage(format!("no such table: {}", idents[0])))?;
            tables.insert(idents[1].clone(), table);
        }
        Ok(0)
    }
}
