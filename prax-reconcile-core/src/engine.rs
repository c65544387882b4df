//! Reconciliation entry points.
//!
//! The host calls [`Reconciler::pre_sync`] before its own schema sync and
//! [`Reconciler::post_sync`] after it. Both are safe to call on every build:
//! every decision is taken from the live schema, so a completed rename or
//! merge is simply not found again.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::column_rename::ColumnRenamer;
use crate::config::RuleSet;
use crate::diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
use crate::error::ReconcileResult;
use crate::inspect::Database;
use crate::merge::TableMergeEngine;
use crate::remap::{DiscriminatorRemapRegistry, RemapSink};
use crate::table_rename::TableRenamer;

/// Result of running one reconciliation stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageReport {
    /// Discriminator remaps handed to the host.
    pub discriminators_published: usize,
    /// Tables renamed.
    pub tables_renamed: usize,
    /// Columns renamed.
    pub columns_renamed: usize,
    /// Non-empty table merges.
    pub tables_merged: usize,
    /// Everything reported along the way, in order.
    pub diagnostics: Vec<Diagnostic>,
    /// Wall time in milliseconds.
    pub duration_ms: u128,
}

impl StageReport {
    /// Total number of changed items.
    pub fn total_changed(&self) -> usize {
        self.tables_renamed + self.columns_renamed + self.tables_merged
    }

    /// Check if the stage changed the schema.
    pub fn has_changes(&self) -> bool {
        self.total_changed() > 0
    }

    /// Check if any rule needs manual resolution.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    /// Get a summary of the report.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if self.discriminators_published > 0 {
            parts.push(format!(
                "{} discriminator remap(s) registered",
                self.discriminators_published
            ));
        }
        if self.tables_renamed > 0 {
            parts.push(format!("{} table(s) renamed", self.tables_renamed));
        }
        if self.columns_renamed > 0 {
            parts.push(format!("{} column(s) renamed", self.columns_renamed));
        }
        if self.tables_merged > 0 {
            parts.push(format!("{} table(s) merged", self.tables_merged));
        }

        if parts.is_empty() {
            "Nothing to do".to_string()
        } else {
            format!("{} in {}ms", parts.join(", "), self.duration_ms)
        }
    }
}

/// Runs the reconciliation stages against one database.
pub struct Reconciler<'db, D: Database + ?Sized> {
    db: &'db D,
}

impl<'db, D: Database + ?Sized> Reconciler<'db, D> {
    /// Create a reconciler.
    pub fn new(db: &'db D) -> Self {
        Self { db }
    }

    /// Run the stages that must precede the host's schema sync: discriminator
    /// remaps, table renames, then column renames.
    pub fn pre_sync(
        &self,
        rules: &RuleSet,
        remap: &mut dyn RemapSink,
    ) -> ReconcileResult<StageReport> {
        let start = Instant::now();
        let mut diagnostics = Diagnostics::new();
        let mut report = StageReport::default();

        let registry = DiscriminatorRemapRegistry::new();
        let merged = registry.assemble(&rules.discriminator_mappings(), &[]);
        report.discriminators_published = registry.publish(&merged, remap, &mut diagnostics);

        report.tables_renamed =
            TableRenamer::new(self.db).apply(&rules.table_renames(), &mut diagnostics)?;
        report.columns_renamed =
            ColumnRenamer::new(self.db).apply(&rules.column_renames(), &mut diagnostics)?;

        report.duration_ms = start.elapsed().as_millis();
        report.diagnostics = diagnostics.into_vec();
        info!(summary = %report.summary(), "Pre-sync reconciliation finished");
        Ok(report)
    }

    /// Run the stage that must follow the host's schema sync: table merges.
    pub fn post_sync(&self, rules: &RuleSet) -> ReconcileResult<StageReport> {
        let start = Instant::now();
        let mut diagnostics = Diagnostics::new();
        let mut report = StageReport::default();

        let engine = TableMergeEngine::with_options(self.db, rules.options.clone());
        report.tables_merged = engine.apply(rules.merge_rules(), &mut diagnostics)?;

        report.duration_ms = start.elapsed().as_millis();
        report.diagnostics = diagnostics.into_vec();
        info!(summary = %report.summary(), "Post-sync reconciliation finished");
        Ok(report)
    }
}
