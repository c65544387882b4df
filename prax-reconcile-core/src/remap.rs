//! Discriminator remap registry.
//!
//! The host rewrites stored discriminator values itself during its schema
//! sync. This module only decides which remaps it should apply and hands
//! them over.

use indexmap::IndexMap;
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::rules::DiscriminatorMapping;

/// Old discriminator value to new discriminator value.
pub type RemapTable = IndexMap<String, String>;

/// Wherever the host's value-rewriting step reads its remap table from.
pub trait RemapSink {
    /// Current contents of the host's remap table.
    fn current(&self) -> RemapTable;

    /// Replace the host's remap table.
    fn replace(&mut self, table: RemapTable);
}

impl RemapSink for RemapTable {
    fn current(&self) -> RemapTable {
        self.clone()
    }

    fn replace(&mut self, table: RemapTable) {
        *self = table;
    }
}

/// Assembles and publishes discriminator remaps.
#[derive(Debug, Default)]
pub struct DiscriminatorRemapRegistry;

impl DiscriminatorRemapRegistry {
    /// Create a new registry.
    pub fn new() -> Self {
        Self
    }

    /// Merge explicit and discovered mappings into one table.
    ///
    /// Explicit entries come first and are never overridden by a discovered
    /// entry for the same old value.
    pub fn assemble(
        &self,
        explicit: &[DiscriminatorMapping],
        discovered: &[DiscriminatorMapping],
    ) -> RemapTable {
        let mut merged = RemapTable::new();
        for mapping in explicit {
            merged.insert(mapping.old_value.clone(), mapping.new_value.clone());
        }
        for mapping in discovered {
            merged
                .entry(mapping.old_value.clone())
                .or_insert_with(|| mapping.new_value.clone());
        }
        merged
    }

    /// Union `merged` into the host's remap table and return the number of
    /// entries published.
    ///
    /// Entries already in the host table (placed there by other
    /// collaborators) are kept as they are.
    pub fn publish(
        &self,
        merged: &RemapTable,
        sink: &mut dyn RemapSink,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        if merged.is_empty() {
            return 0;
        }

        let mut table = sink.current();
        for (old, new) in merged {
            if let Some(existing) = table.get(old) {
                if existing != new {
                    debug!(
                        old = %old,
                        existing = %existing,
                        ignored = %new,
                        "Remap already claimed by host"
                    );
                }
                continue;
            }
            table.insert(old.clone(), new.clone());
        }
        sink.replace(table);

        diagnostics.notice(
            DiagnosticKind::Published,
            format!("Registered {} discriminator remap(s)", merged.len()),
        );
        merged.len()
    }

    /// Assemble and publish in one step.
    pub fn apply(
        &self,
        explicit: &[DiscriminatorMapping],
        discovered: &[DiscriminatorMapping],
        sink: &mut dyn RemapSink,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let merged = self.assemble(explicit, discovered);
        self.publish(&merged, sink, diagnostics)
    }
}
