//! Schema introspection and statement execution seams.
//!
//! The engine never talks to a driver directly. A host hands it something
//! implementing [`Database`], which is any type that can both answer schema
//! questions ([`SchemaInspector`]) and run statements ([`StatementExecutor`]).
//! Answers are never cached: every rule re-asks, because an earlier rule may
//! have changed what exists.

use indexmap::IndexMap;

use crate::dialect::Dialect;
use crate::error::ReconcileResult;

/// Raw column information from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name as stored.
    pub name: String,
    /// Declared type (e.g. "INTEGER", "varchar(255)").
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default value literal, exactly as introspected.
    pub default: Option<String>,
}

impl ColumnInfo {
    /// Create a nullable column with no default.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
        }
    }

    /// Set nullability.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the default literal.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Columns of a table keyed by name, in declaration order.
pub type ColumnMap = IndexMap<String, ColumnInfo>;

/// Build a [`ColumnMap`] from a list of columns.
pub fn column_map(columns: impl IntoIterator<Item = ColumnInfo>) -> ColumnMap {
    columns.into_iter().map(|c| (c.name.clone(), c)).collect()
}

/// Find a column by name, ignoring ASCII case. Returns the stored name.
pub fn find_column_ci<'a>(columns: &'a ColumnMap, name: &str) -> Option<&'a str> {
    columns
        .keys()
        .find(|c| c.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

/// Read-only view of the live schema.
pub trait SchemaInspector {
    /// Check whether a table exists, matching its name case-insensitively.
    fn table_exists(&self, table: &str) -> ReconcileResult<bool>;

    /// List a table's columns in declaration order.
    fn list_columns(&self, table: &str) -> ReconcileResult<ColumnMap>;

    /// Count the rows in a table.
    fn row_count(&self, table: &str) -> ReconcileResult<u64>;
}

/// Statement execution against the live schema.
pub trait StatementExecutor {
    /// The SQL dialect statements must be generated for.
    fn dialect(&self) -> Dialect;

    /// Execute one statement, binding `params` positionally, and return the
    /// number of affected rows.
    fn execute(&self, sql: &str, params: &[&str]) -> ReconcileResult<u64>;
}

/// A connection that can both inspect and mutate the schema.
pub trait Database: SchemaInspector + StatementExecutor {}

impl<T: SchemaInspector + StatementExecutor + ?Sized> Database for T {}
