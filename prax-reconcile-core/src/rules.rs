//! Typed rule values consumed by the reconciliation stages.
//!
//! Rules arrive fully resolved: the host has already walked its type
//! registry and loaded configuration. Nothing in here touches the database.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rewrite of a stored type discriminator value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscriminatorMapping {
    /// Value currently stored in the database.
    pub old_value: String,
    /// Value it should be rewritten to.
    pub new_value: String,
}

impl DiscriminatorMapping {
    /// Create a new mapping.
    pub fn new(old_value: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }
}

/// Rename of a whole table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRenameRule {
    /// Legacy table name.
    pub old_name: String,
    /// Declared table name.
    pub new_name: String,
}

impl TableRenameRule {
    /// Create a new table rename rule.
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }
}

/// Rename of a column within an existing table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRenameRule {
    /// Table that owns the column.
    pub table: String,
    /// Legacy column name.
    pub old_column: String,
    /// Declared column name.
    pub new_column: String,
}

impl ColumnRenameRule {
    /// Create a new column rename rule.
    pub fn new(
        table: impl Into<String>,
        old_column: impl Into<String>,
        new_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            old_column: old_column.into(),
            new_column: new_column.into(),
        }
    }
}

/// Side-table column stamped on rows that came from a merged source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerSpec {
    /// Table holding the marker column (shares primary keys with the source).
    pub table: String,
    /// Column to stamp.
    pub column: String,
    /// Literal value to write.
    pub value: String,
}

impl MarkerSpec {
    /// Create a new marker spec.
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Consolidation of a deprecated table into its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMergeRule {
    /// Deprecated table whose rows are moved.
    #[serde(rename = "source")]
    pub source_table: String,
    /// Replacement table receiving the rows.
    #[serde(rename = "target")]
    pub target_table: String,
    /// Source column to target column mapping.
    #[serde(default, rename = "columns")]
    pub column_mapping: IndexMap<String, String>,
    /// Optional marker stamped on migrated rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerSpec>,
    /// Whether `_Live` and `_Versions` siblings are migrated too.
    #[serde(default)]
    pub versioned: bool,
}

impl TableMergeRule {
    /// Create a merge rule with no column mapping, marker or versioning.
    pub fn new(source_table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            target_table: target_table.into(),
            column_mapping: IndexMap::new(),
            marker: None,
            versioned: false,
        }
    }

    /// Map a source column onto a differently named target column.
    pub fn map_column(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.column_mapping.insert(source.into(), target.into());
        self
    }

    /// Stamp migrated rows with a marker.
    pub fn marker(mut self, marker: MarkerSpec) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Also migrate `_Live` and `_Versions` siblings.
    pub fn versioned(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }
}

/// Column names the merge engine keys rows on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeKeys {
    /// Primary key of main and `_Live` tables.
    pub primary_key: String,
    /// Record identifier column of `_Versions` tables.
    pub record_id: String,
    /// Version number column of `_Versions` tables.
    pub version: String,
    /// Suffix of the published-state sibling.
    pub live_suffix: String,
    /// Suffix of the history sibling.
    pub versions_suffix: String,
}

impl Default for MergeKeys {
    fn default() -> Self {
        Self {
            primary_key: "ID".to_string(),
            record_id: "RecordID".to_string(),
            version: "Version".to_string(),
            live_suffix: "_Live".to_string(),
            versions_suffix: "_Versions".to_string(),
        }
    }
}

impl MergeKeys {
    /// Name of the `_Live` sibling of a table.
    pub fn live_table(&self, table: &str) -> String {
        format!("{}{}", table, self.live_suffix)
    }

    /// Name of the `_Versions` sibling of a table.
    pub fn versions_table(&self, table: &str) -> String {
        format!("{}{}", table, self.versions_suffix)
    }
}

/// When to reconcile target rows whose keys already existed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapReconcile {
    /// Only when the insert step inserted nothing.
    #[default]
    WhenNothingInserted,
    /// Whenever there is more than the key to copy.
    Always,
}

/// Tuning for the merge stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Key and sibling naming.
    pub keys: MergeKeys,
    /// Overlap reconciliation policy.
    pub reconcile: OverlapReconcile,
}

impl MergeOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key naming.
    pub fn keys(mut self, keys: MergeKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Set the overlap reconciliation policy.
    pub fn reconcile(mut self, reconcile: OverlapReconcile) -> Self {
        self.reconcile = reconcile;
        self
    }
}
