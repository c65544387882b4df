//! # prax-reconcile-core
//!
//! Idempotent schema reconciliation for databases whose declared model has
//! drifted from the live schema.
//!
//! This crate resolves three kinds of drift:
//! - Stale type discriminator values (handed to the host's own rewriter)
//! - Renamed tables and columns
//! - Deprecated tables consolidated into a replacement, including their
//!   `_Live` and `_Versions` siblings
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   pre_sync    ┌──────────────────┐
//! │   RuleSet     │──────────────▶│ Discriminators   │
//! └───────────────┘               │ Table renames    │
//!         │                       │ Column renames   │
//!         │                       └──────────────────┘
//!         │                                │
//!         │                                ▼
//!         │                       ┌──────────────────┐
//!         │                       │ host schema sync │
//!         │                       └──────────────────┘
//!         │        post_sync               │
//!         └───────────────────────────────▶▼
//!                                 ┌──────────────────┐
//!                                 │ Table merges     │
//!                                 └──────────────────┘
//! ```
//!
//! Nothing is remembered between runs. Every rule re-reads the schema, so a
//! second run over an already reconciled database does nothing. Deprecated
//! tables are never dropped, only renamed aside to `_obsolete_<name>`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use prax_reconcile_core::{Reconciler, RuleSet, TableMergeRule, MarkerSpec, RemapTable};
//!
//! let rules = RuleSet::new()
//!     .rename_table("OldModel", "NewModel")
//!     .merge(
//!         TableMergeRule::new("BlockBanner", "BlockHero")
//!             .map_column("BannerTitle", "Title")
//!             .marker(MarkerSpec::new("Element", "Style", "banner-style"))
//!             .versioned(true),
//!     );
//!
//! let reconciler = Reconciler::new(&db);
//! let mut remap = RemapTable::new();
//!
//! let before = reconciler.pre_sync(&rules, &mut remap)?;
//! // ... host runs its schema sync ...
//! let after = reconciler.post_sync(&rules)?;
//!
//! println!("{} / {}", before.summary(), after.summary());
//! ```

pub mod archive;
pub mod column_rename;
pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod inspect;
pub mod merge;
pub mod pairs;
pub mod remap;
pub mod rules;
pub mod sql;
pub mod table_rename;

#[cfg(test)]
mod testing;

// Re-exports
pub use archive::{OBSOLETE_PREFIX, archive_table, obsolete_name_for};
pub use column_rename::ColumnRenamer;
pub use config::{DiscoveredRules, RuleSet};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLevel, Diagnostics};
pub use dialect::Dialect;
pub use engine::{Reconciler, StageReport};
pub use error::{ReconcileError, ReconcileResult};
pub use inspect::{ColumnInfo, ColumnMap, Database, SchemaInspector, StatementExecutor};
pub use merge::{MergeOutcome, MergeStats, TableMergeEngine, TableMigration};
pub use pairs::{ColumnPairs, build_column_pairs, build_history_pairs};
pub use remap::{DiscriminatorRemapRegistry, RemapSink, RemapTable};
pub use rules::{
    ColumnRenameRule, DiscriminatorMapping, MarkerSpec, MergeKeys, MergeOptions,
    OverlapReconcile, TableMergeRule, TableRenameRule,
};
pub use table_rename::{TableRenameOutcome, TableRenamer};
