//! SQL dialects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inspect::ColumnInfo;

/// The SQL dialect of the target database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SQLite.
    #[default]
    Sqlite,
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB.
    #[serde(alias = "mariadb")]
    MySql,
}

impl Dialect {
    /// Quote an identifier, doubling any embedded quote character.
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Self::MySql => format!("`{}`", ident.replace('`', "``")),
            Self::Sqlite | Self::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Placeholder for the `index`th (1-based) bound parameter.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::Sqlite | Self::MySql => "?".to_string(),
        }
    }

    /// Generate a table rename.
    pub fn rename_table(&self, from: &str, to: &str) -> String {
        match self {
            Self::MySql => format!("RENAME TABLE {} TO {}", self.quote(from), self.quote(to)),
            Self::Sqlite | Self::Postgres => format!(
                "ALTER TABLE {} RENAME TO {}",
                self.quote(from),
                self.quote(to)
            ),
        }
    }

    /// Generate a column rename that keeps the column's declared type,
    /// nullability and default.
    ///
    /// MySQL's `CHANGE COLUMN` must restate the full definition, so it is
    /// built from the introspected column. The other dialects keep the
    /// definition on `RENAME COLUMN`.
    pub fn rename_column(&self, table: &str, column: &ColumnInfo, to: &str) -> String {
        match self {
            Self::MySql => {
                let mut sql = format!(
                    "ALTER TABLE {} CHANGE COLUMN {} {} {}",
                    self.quote(table),
                    self.quote(&column.name),
                    self.quote(to),
                    column.data_type
                );
                sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
                if let Some(default) = &column.default {
                    sql.push_str(" DEFAULT ");
                    sql.push_str(default);
                }
                sql
            }
            Self::Sqlite | Self::Postgres => format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                self.quote(table),
                self.quote(&column.name),
                self.quote(to)
            ),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Postgres => f.write_str("postgres"),
            Self::MySql => f.write_str("mysql"),
        }
    }
}
