//! Table merge engine.
//!
//! Consolidates a deprecated table into its replacement and archives the
//! deprecated table. For versioned tables the `_Live` sibling is merged the
//! same way, and the `_Versions` history is merged on its compound
//! `(record id, version)` key.
//!
//! ```text
//! source absent                    -> nothing to do
//! source present, target absent    -> configuration gap, wait for schema sync
//! source present, target present:
//!     source empty                 -> archive
//!     source has rows              -> migrate -> stamp marker -> archive
//! ```
//!
//! Rows are only ever inserted when their key is missing from the target, so
//! a re-run after a partial merge picks up where the last one stopped.

use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::archive::archive_table;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::ReconcileResult;
use crate::inspect::{Database, find_column_ci};
use crate::pairs::{ColumnPairs, build_column_pairs, build_history_pairs, find_pair};
use crate::rules::{MarkerSpec, MergeOptions, OverlapReconcile, TableMergeRule};
use crate::sql;

/// Counts from migrating one keyed table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableMigration {
    /// Rows inserted into the target.
    pub inserted: u64,
    /// Existing target rows reconciled from the source.
    pub reconciled: u64,
}

/// Summary of a completed merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Main table migration.
    pub main: TableMigration,
    /// `_Live` table migration, if one ran.
    pub live: Option<TableMigration>,
    /// `_Versions` rows inserted, if the history was migrated.
    pub history_inserted: Option<u64>,
    /// Rows stamped with the marker value (main and `_Live`).
    pub marked: u64,
    /// Names the source tables were archived under.
    pub archived: Vec<String>,
}

/// Outcome of a single merge rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The source table does not exist.
    SourceAbsent,
    /// The target table does not exist yet.
    TargetAbsent,
    /// The source was empty and has been archived.
    ArchivedEmpty {
        /// Archive names.
        archived: Vec<String>,
    },
    /// Source and target share no usable columns. Nothing was changed.
    Incompatible,
    /// Rows were migrated and the source archived.
    Merged(MergeStats),
}

impl MergeOutcome {
    /// Check if rows were merged.
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged(_))
    }
}

/// Consolidates deprecated tables into their replacements.
pub struct TableMergeEngine<'db, D: Database + ?Sized> {
    db: &'db D,
    options: MergeOptions,
}

impl<'db, D: Database + ?Sized> TableMergeEngine<'db, D> {
    /// Create an engine with default options.
    pub fn new(db: &'db D) -> Self {
        Self::with_options(db, MergeOptions::default())
    }

    /// Create an engine with explicit options.
    pub fn with_options(db: &'db D, options: MergeOptions) -> Self {
        Self { db, options }
    }

    /// Apply every rule and return the number of non-empty merges.
    pub fn apply(
        &self,
        rules: &[TableMergeRule],
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<usize> {
        let mut merged = 0;
        for rule in rules {
            if self.merge_one(rule, diagnostics)?.is_merged() {
                merged += 1;
            }
        }

        if merged > 0 {
            diagnostics.notice(
                DiagnosticKind::Merged,
                format!("Merged {} table(s)", merged),
            );
        }
        Ok(merged)
    }

    /// Apply a single merge rule.
    #[instrument(skip_all, fields(source = %rule.source_table, target = %rule.target_table))]
    pub fn merge_one(
        &self,
        rule: &TableMergeRule,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<MergeOutcome> {
        let source = rule.source_table.as_str();
        let target = rule.target_table.as_str();

        if !self.db.table_exists(source)? {
            diagnostics.notice(
                DiagnosticKind::NothingToDo,
                format!("Nothing to merge: '{}' does not exist", source),
            );
            return Ok(MergeOutcome::SourceAbsent);
        }

        if !self.db.table_exists(target)? {
            diagnostics.notice(
                DiagnosticKind::ConfigurationGap,
                format!(
                    "Cannot merge '{}' into '{}': target table does not exist yet",
                    source, target
                ),
            );
            return Ok(MergeOutcome::TargetAbsent);
        }

        let rows = self.db.row_count(source)?;
        if rows == 0 {
            let archived = self.archive_all(source, rule.versioned, diagnostics)?;
            return Ok(MergeOutcome::ArchivedEmpty { archived });
        }

        let Some(main) = self.migrate_keyed(source, target, &rule.column_mapping, diagnostics)?
        else {
            return Ok(MergeOutcome::Incompatible);
        };

        let mut stats = MergeStats {
            main,
            ..Default::default()
        };
        // Siblings whose data could not be carried over stay in place.
        let mut keep = Vec::new();

        if rule.versioned {
            let keys = &self.options.keys;

            let source_live = keys.live_table(source);
            let target_live = keys.live_table(target);
            if self.db.table_exists(&source_live)? {
                if self.sibling_target(&source_live, &target_live, diagnostics)? {
                    stats.live = self.migrate_keyed(
                        &source_live,
                        &target_live,
                        &rule.column_mapping,
                        diagnostics,
                    )?;
                }
                if stats.live.is_none() {
                    keep.push(source_live);
                }
            }

            let source_versions = keys.versions_table(source);
            let target_versions = keys.versions_table(target);
            if self.db.table_exists(&source_versions)? {
                if self.sibling_target(&source_versions, &target_versions, diagnostics)? {
                    stats.history_inserted = self.migrate_history(
                        &source_versions,
                        &target_versions,
                        &rule.column_mapping,
                        diagnostics,
                    )?;
                }
                if stats.history_inserted.is_none() {
                    keep.push(source_versions);
                }
            }
        }

        if let Some(marker) = &rule.marker {
            stats.marked += self.stamp_marker(marker, &marker.table, source, diagnostics)?;
            if stats.live.is_some() {
                let keys = &self.options.keys;
                stats.marked += self.stamp_marker(
                    marker,
                    &keys.live_table(&marker.table),
                    &keys.live_table(source),
                    diagnostics,
                )?;
            }
        }

        stats.archived.push(archive_table(self.db, source, diagnostics)?);
        if rule.versioned {
            for sibling in self.siblings(source) {
                if !keep.contains(&sibling) && self.db.table_exists(&sibling)? {
                    stats.archived.push(archive_table(self.db, &sibling, diagnostics)?);
                }
            }
        }

        diagnostics.changed(
            DiagnosticKind::Merged,
            format!(
                "Merged '{}' into '{}': {} row(s) inserted, {} reconciled",
                source, target, stats.main.inserted, stats.main.reconciled
            ),
        );
        Ok(MergeOutcome::Merged(stats))
    }

    fn siblings(&self, table: &str) -> [String; 2] {
        let keys = &self.options.keys;
        [keys.live_table(table), keys.versions_table(table)]
    }

    /// Archive a table and, when versioned, whichever siblings exist.
    fn archive_all(
        &self,
        source: &str,
        versioned: bool,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<Vec<String>> {
        let mut archived = vec![archive_table(self.db, source, diagnostics)?];
        if versioned {
            for sibling in self.siblings(source) {
                if self.db.table_exists(&sibling)? {
                    archived.push(archive_table(self.db, &sibling, diagnostics)?);
                }
            }
        }
        Ok(archived)
    }

    fn sibling_target(
        &self,
        source: &str,
        target: &str,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<bool> {
        if self.db.table_exists(target)? {
            return Ok(true);
        }
        diagnostics.notice(
            DiagnosticKind::ConfigurationGap,
            format!(
                "Cannot merge '{}' into '{}': target table does not exist yet",
                source, target
            ),
        );
        Ok(false)
    }

    /// Migrate a table keyed by its primary key.
    ///
    /// Returns `None` if the tables can't be paired, after reporting it.
    fn migrate_keyed(
        &self,
        source: &str,
        target: &str,
        mapping: &IndexMap<String, String>,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<Option<TableMigration>> {
        let dialect = self.db.dialect();
        let primary_key = self.options.keys.primary_key.as_str();

        let source_columns = self.db.list_columns(source)?;
        let target_columns = self.db.list_columns(target)?;
        let pairs = build_column_pairs(&source_columns, &target_columns, mapping, primary_key);

        if pairs.is_empty() {
            self.report_incompatible(source, target, "no matching columns", diagnostics);
            return Ok(None);
        }
        let Some(key) = find_pair(&pairs, primary_key) else {
            self.report_incompatible(source, target, "no shared primary key", diagnostics);
            return Ok(None);
        };

        let insert = sql::insert_missing(dialect, source, target, &pairs, &[key]);
        debug!(sql = %insert, "Inserting missing rows");
        let inserted = self.db.execute(&insert, &[])?;

        let reconcile = match self.options.reconcile {
            OverlapReconcile::WhenNothingInserted => inserted == 0,
            OverlapReconcile::Always => true,
        };
        let mut reconciled = 0;
        if reconcile && pairs.len() > 1 {
            if let Some(update) = sql::update_from_source(dialect, source, target, &pairs, key) {
                debug!(sql = %update, "Reconciling existing rows");
                reconciled = self.db.execute(&update, &[])?;
            }
        }

        info!(source, target, inserted, reconciled, "Migrated table rows");
        Ok(Some(TableMigration {
            inserted,
            reconciled,
        }))
    }

    /// Migrate a history table on its compound key.
    ///
    /// Returns `None` if the tables can't be paired, after reporting it.
    fn migrate_history(
        &self,
        source: &str,
        target: &str,
        mapping: &IndexMap<String, String>,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<Option<u64>> {
        let keys = &self.options.keys;
        let compound = [keys.record_id.as_str(), keys.version.as_str()];

        let source_columns = self.db.list_columns(source)?;
        let target_columns = self.db.list_columns(target)?;
        let pairs: ColumnPairs = build_history_pairs(
            &source_columns,
            &target_columns,
            mapping,
            &keys.primary_key,
            &compound,
        );

        let (Some(record_id), Some(version)) =
            (find_pair(&pairs, compound[0]), find_pair(&pairs, compound[1]))
        else {
            self.report_incompatible(
                source,
                target,
                "history tables lack the record id and version columns",
                diagnostics,
            );
            return Ok(None);
        };

        let insert =
            sql::insert_missing(self.db.dialect(), source, target, &pairs, &[record_id, version]);
        debug!(sql = %insert, "Inserting missing history rows");
        let inserted = self.db.execute(&insert, &[])?;

        info!(source, target, inserted, "Migrated history rows");
        Ok(Some(inserted))
    }

    /// Stamp `marker` onto rows of `table` that came from `source`.
    fn stamp_marker(
        &self,
        marker: &MarkerSpec,
        table: &str,
        source: &str,
        diagnostics: &mut Diagnostics,
    ) -> ReconcileResult<u64> {
        let primary_key = self.options.keys.primary_key.as_str();

        if !self.db.table_exists(table)? {
            diagnostics.notice(
                DiagnosticKind::ConfigurationGap,
                format!("Marker table '{}' does not exist, not stamping", table),
            );
            return Ok(0);
        }

        let marker_columns = self.db.list_columns(table)?;
        let source_columns = self.db.list_columns(source)?;
        let resolved = (
            find_column_ci(&marker_columns, &marker.column),
            find_column_ci(&marker_columns, primary_key),
            find_column_ci(&source_columns, primary_key),
        );
        let (Some(column), Some(table_key), Some(source_key)) = resolved else {
            diagnostics.notice(
                DiagnosticKind::ConfigurationGap,
                format!(
                    "Cannot stamp '{}.{}': column or primary key missing",
                    table, marker.column
                ),
            );
            return Ok(0);
        };

        let update =
            sql::stamp_marker(self.db.dialect(), table, column, table_key, source, source_key);
        debug!(sql = %update, "Stamping marker");
        let marked = self.db.execute(&update, &[marker.value.as_str()])?;
        if marked > 0 {
            diagnostics.changed(
                DiagnosticKind::Merged,
                format!(
                    "Set '{}.{}' to '{}' on {} migrated row(s)",
                    table, column, marker.value, marked
                ),
            );
        }
        Ok(marked)
    }

    fn report_incompatible(
        &self,
        source: &str,
        target: &str,
        reason: &str,
        diagnostics: &mut Diagnostics,
    ) {
        diagnostics.notice(
            DiagnosticKind::SchemaIncompatibility,
            format!(
                "Skipping merge of '{}' into '{}': {}; both tables left intact",
                source, target, reason
            ),
        );
    }
}
