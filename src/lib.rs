//! # Prax Reconcile
//!
//! One-shot, idempotent schema reconciliation for Prax ORM databases.
//!
//! Moves a live database toward its declared shape around the host's own
//! schema sync:
//! - Before sync: publish discriminator remaps, rename tables, rename columns
//! - After sync: merge deprecated tables (and their `_Live` / `_Versions`
//!   siblings) into their replacements, then archive them
//!
//! Re-running either stage over an already reconciled database does nothing.
//! Conflicts that would need a human to decide are reported, never guessed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prax_reconcile::prelude::*;
//!
//! fn reconcile() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = SqliteDatabase::open(&SqliteConfig::from_url("sqlite://./site.db")?)?;
//!     let rules = RuleSet::load("reconcile.toml")?;
//!     let reconciler = Reconciler::new(&db);
//!
//!     let mut remap = RemapTable::new();
//!     let before = reconciler.pre_sync(&rules, &mut remap)?;
//!     // host schema sync runs here, applying `remap`
//!     let after = reconciler.post_sync(&rules)?;
//!
//!     for diagnostic in before.diagnostics.iter().chain(&after.diagnostics) {
//!         println!("{}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Reconciliation engine, rules and introspection seams.
pub mod engine {
    pub use prax_reconcile_core::*;
}

/// SQLite backend.
#[cfg(feature = "sqlite")]
pub mod sqlite {
    pub use prax_reconcile_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use prax_reconcile_core::{
        Diagnostic, DiagnosticKind, DiagnosticLevel, DiscoveredRules, MarkerSpec, MergeOptions,
        OverlapReconcile, ReconcileError, ReconcileResult, Reconciler, RemapTable, RuleSet,
        StageReport, TableMergeRule,
    };

    #[cfg(feature = "sqlite")]
    pub use prax_reconcile_sqlite::{SqliteConfig, SqliteDatabase};
}

// Re-export key types at the crate root
pub use prax_reconcile_core::{ReconcileError, ReconcileResult, Reconciler, RuleSet, StageReport};
