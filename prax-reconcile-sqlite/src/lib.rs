//! SQLite backend for Prax schema reconciliation.
//!
//! Implements [`SchemaInspector`](prax_reconcile_core::SchemaInspector) and
//! [`StatementExecutor`](prax_reconcile_core::StatementExecutor) over a
//! blocking `rusqlite` connection. Introspection reads `sqlite_master` and
//! `pragma_table_info`.
//!
//! # Example
//!
//! ```rust,ignore
//! use prax_reconcile_core::{Reconciler, RuleSet};
//! use prax_reconcile_sqlite::{SqliteConfig, SqliteDatabase};
//!
//! let db = SqliteDatabase::open(&SqliteConfig::from_url("sqlite://./site.db")?)?;
//! let report = Reconciler::new(&db).post_sync(&RuleSet::load("reconcile.toml")?)?;
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod database;
pub mod error;

pub use config::{DatabasePath, SqliteConfig};
pub use database::SqliteDatabase;
pub use error::{SqliteError, SqliteResult};
