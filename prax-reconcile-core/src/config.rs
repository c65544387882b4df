//! Rule-set loading.
//!
//! Hosts usually assemble rules from their own configuration system. For
//! hosts that don't, rules can live in a TOML file next to the schema:
//!
//! ```toml
//! [discriminators]
//! "App\\Blocks\\Banner" = "App\\Blocks\\Hero"
//!
//! [tables]
//! OldModel = "NewModel"
//!
//! [columns.Element]
//! Heading = "Title"
//!
//! [[merges]]
//! source = "BlockBanner"
//! target = "BlockHero"
//! versioned = true
//!
//! [merges.columns]
//! BannerTitle = "Title"
//!
//! [merges.marker]
//! table = "Element"
//! column = "Style"
//! value = "banner-style"
//!
//! [options]
//! reconcile = "always"
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReconcileError, ReconcileResult};
use crate::rules::{
    ColumnRenameRule, DiscriminatorMapping, MergeOptions, TableMergeRule, TableRenameRule,
};

/// Rules discovered by the host from its declared types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredRules {
    /// Legacy discriminator value to current value.
    pub discriminators: IndexMap<String, String>,
    /// Legacy table name to current table name.
    pub tables: IndexMap<String, String>,
}

impl DiscoveredRules {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discovered discriminator remap.
    pub fn discriminator(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.discriminators.insert(old.into(), new.into());
        self
    }

    /// Add a discovered table rename.
    pub fn table(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.tables.insert(old.into(), new.into());
        self
    }
}

/// The full set of rules for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    /// Discriminator remaps, old value to new value.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub discriminators: IndexMap<String, String>,
    /// Table renames, old name to new name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tables: IndexMap<String, String>,
    /// Column renames per table, old column to new column.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub columns: IndexMap<String, IndexMap<String, String>>,
    /// Table merges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<TableMergeRule>,
    /// Merge stage tuning.
    #[serde(default)]
    pub options: MergeOptions,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a rule set from TOML.
    pub fn from_toml_str(content: &str) -> ReconcileResult<Self> {
        toml::from_str(content)
            .map_err(|e| ReconcileError::config(format!("Failed to parse rule file: {}", e)))
    }

    /// Load a rule set from a file. A missing file is an empty rule set.
    pub fn load(path: impl AsRef<Path>) -> ReconcileResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "No rule file, using empty rule set");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let rules = Self::from_toml_str(&content)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Add a discriminator remap.
    pub fn discriminator(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.discriminators.insert(old.into(), new.into());
        self
    }

    /// Add a table rename.
    pub fn rename_table(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.tables.insert(old.into(), new.into());
        self
    }

    /// Add a column rename.
    pub fn rename_column(
        mut self,
        table: impl Into<String>,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        self.columns
            .entry(table.into())
            .or_default()
            .insert(old.into(), new.into());
        self
    }

    /// Add a table merge.
    pub fn merge(mut self, rule: TableMergeRule) -> Self {
        self.merges.push(rule);
        self
    }

    /// Set merge options.
    pub fn options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Fold discovered rules in underneath the explicit ones.
    ///
    /// An explicit entry is never overridden by a discovered one for the
    /// same key.
    pub fn with_discovered(mut self, discovered: DiscoveredRules) -> Self {
        for (old, new) in discovered.discriminators {
            self.discriminators.entry(old).or_insert(new);
        }
        for (old, new) in discovered.tables {
            self.tables.entry(old).or_insert(new);
        }
        self
    }

    /// Discriminator mappings in declaration order.
    pub fn discriminator_mappings(&self) -> Vec<DiscriminatorMapping> {
        self.discriminators
            .iter()
            .map(|(old, new)| DiscriminatorMapping::new(old, new))
            .collect()
    }

    /// Table renames in declaration order.
    pub fn table_renames(&self) -> Vec<TableRenameRule> {
        self.tables
            .iter()
            .map(|(old, new)| TableRenameRule::new(old, new))
            .collect()
    }

    /// Column renames grouped by table.
    pub fn column_renames(&self) -> IndexMap<String, Vec<ColumnRenameRule>> {
        self.columns
            .iter()
            .map(|(table, renames)| {
                let rules = renames
                    .iter()
                    .map(|(old, new)| ColumnRenameRule::new(table, old, new))
                    .collect();
                (table.clone(), rules)
            })
            .collect()
    }

    /// Merge rules in declaration order.
    pub fn merge_rules(&self) -> &[TableMergeRule] {
        &self.merges
    }

    /// Check if there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.discriminators.is_empty()
            && self.tables.is_empty()
            && self.columns.values().all(IndexMap::is_empty)
            && self.merges.is_empty()
    }

    /// Validate every rule.
    pub fn validate(&self) -> ReconcileResult<()> {
        for (old, new) in &self.discriminators {
            if old.is_empty() || new.is_empty() {
                return Err(ReconcileError::invalid_rule(format!(
                    "discriminator remap '{}' -> '{}' has an empty side",
                    old, new
                )));
            }
        }

        for (old, new) in &self.tables {
            check_rename("table", old, new)?;
        }

        for (table, renames) in &self.columns {
            if table.is_empty() {
                return Err(ReconcileError::invalid_rule(
                    "column renames declared for an empty table name",
                ));
            }
            for (old, new) in renames {
                check_rename(&format!("column on '{}'", table), old, new)?;
            }
        }

        for rule in &self.merges {
            if rule.source_table.is_empty() || rule.target_table.is_empty() {
                return Err(ReconcileError::invalid_rule(
                    "merge rule needs both a source and a target table",
                ));
            }
            if rule.source_table == rule.target_table {
                return Err(ReconcileError::invalid_rule(format!(
                    "merge rule merges '{}' into itself",
                    rule.source_table
                )));
            }
            for (source, target) in &rule.column_mapping {
                if source.is_empty() || target.is_empty() {
                    return Err(ReconcileError::invalid_rule(format!(
                        "merge '{}' -> '{}' maps an empty column name",
                        rule.source_table, rule.target_table
                    )));
                }
            }
            if let Some(marker) = &rule.marker {
                if marker.table.is_empty() || marker.column.is_empty() {
                    return Err(ReconcileError::invalid_rule(format!(
                        "merge '{}' -> '{}' has a marker without table or column",
                        rule.source_table, rule.target_table
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_rename(what: &str, old: &str, new: &str) -> ReconcileResult<()> {
    if old.is_empty() || new.is_empty() {
        return Err(ReconcileError::invalid_rule(format!(
            "{} rename '{}' -> '{}' has an empty side",
            what, old, new
        )));
    }
    if old == new {
        return Err(ReconcileError::invalid_rule(format!(
            "{} rename '{}' renames to itself",
            what, old
        )));
    }
    Ok(())
}
