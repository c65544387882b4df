//! SQLite implementation of the introspection and execution seams.

use std::time::Duration;

use prax_reconcile_core::{
    ColumnInfo, ColumnMap, Dialect, ReconcileResult, SchemaInspector, StatementExecutor, sql,
};
use rusqlite::{Connection, OptionalExtension, params_from_iter};
use tracing::{debug, trace};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};

/// A SQLite database the reconciler can inspect and mutate.
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Open a database from configuration.
    pub fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory()?,
            DatabasePath::File(path) => Connection::open(path)?,
        };

        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        if let Some(ms) = config.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(u64::from(ms)))?;
        }

        debug!(path = %config.path, "Opened SQLite database");
        Ok(Self { conn })
    }

    /// Open a fresh in-memory database.
    pub fn in_memory() -> SqliteResult<Self> {
        Self::open(&SqliteConfig::memory())
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consume the wrapper and return the connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn query_columns(&self, table: &str) -> SqliteResult<ColumnMap> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let rows = stmt.query_map([table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                data_type: row.get(1)?,
                nullable: row.get::<_, i64>(2)? == 0,
                default: row.get(3)?,
            })
        })?;

        let mut columns = ColumnMap::new();
        for column in rows {
            let column = column?;
            columns.insert(column.name.clone(), column);
        }
        Ok(columns)
    }
}

impl SchemaInspector for SqliteDatabase {
    fn table_exists(&self, table: &str) -> ReconcileResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                [table],
                |_| Ok(()),
            )
            .optional()
            .map_err(SqliteError::from)?;
        Ok(found.is_some())
    }

    fn list_columns(&self, table: &str) -> ReconcileResult<ColumnMap> {
        Ok(self.query_columns(table)?)
    }

    fn row_count(&self, table: &str) -> ReconcileResult<u64> {
        let sql = sql::count_rows(Dialect::Sqlite, table);
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(SqliteError::from)?;
        Ok(count.max(0) as u64)
    }
}

impl StatementExecutor for SqliteDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&self, sql: &str, params: &[&str]) -> ReconcileResult<u64> {
        trace!(sql, params = ?params, "Executing statement");
        let affected = self
            .conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(SqliteError::from)?;
        Ok(affected as u64)
    }
}
