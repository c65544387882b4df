//! Column pairing between a merge source and target.

use indexmap::IndexMap;

use crate::inspect::{ColumnMap, find_column_ci};

/// Source column to target column, in statement order.
pub type ColumnPairs = IndexMap<String, String>;

fn push_pair(pairs: &mut ColumnPairs, source: &str, target: &str) {
    if pairs.contains_key(source) || pairs.values().any(|t| t == target) {
        return;
    }
    pairs.insert(source.to_string(), target.to_string());
}

/// Pair explicit mappings, then identically named columns.
///
/// An explicit `source -> target` entry is matched against the source table
/// case-insensitively under either name, because the column may already
/// carry its target name after the column-rename stage.
fn pair_mapped_and_matching(
    pairs: &mut ColumnPairs,
    source: &ColumnMap,
    target: &ColumnMap,
    mapping: &IndexMap<String, String>,
    skip: impl Fn(&str) -> bool,
) {
    for (source_col, target_col) in mapping {
        let resolved_source =
            find_column_ci(source, source_col).or_else(|| find_column_ci(source, target_col));
        let resolved_target = find_column_ci(target, target_col);
        if let (Some(s), Some(t)) = (resolved_source, resolved_target) {
            if !skip(s) && !skip(t) {
                push_pair(pairs, s, t);
            }
        }
    }

    for name in source.keys() {
        if !skip(name) && target.contains_key(name) {
            push_pair(pairs, name, name);
        }
    }
}

/// Build the column pairs for a table keyed by `primary_key`.
///
/// Order is: the primary key (when both sides have it), explicit mappings,
/// then exact name matches. An empty result means the tables share nothing.
pub fn build_column_pairs(
    source: &ColumnMap,
    target: &ColumnMap,
    mapping: &IndexMap<String, String>,
    primary_key: &str,
) -> ColumnPairs {
    let mut pairs = ColumnPairs::new();

    if let (Some(s), Some(t)) = (
        find_column_ci(source, primary_key),
        find_column_ci(target, primary_key),
    ) {
        push_pair(&mut pairs, s, t);
    }

    pair_mapped_and_matching(&mut pairs, source, target, mapping, |_| false);
    pairs
}

/// Build the column pairs for a history table.
///
/// The history table's own row identifier (`primary_key`) is never carried
/// over. The compound key columns are always identity-paired when both
/// sides have them.
pub fn build_history_pairs(
    source: &ColumnMap,
    target: &ColumnMap,
    mapping: &IndexMap<String, String>,
    primary_key: &str,
    compound_key: &[&str],
) -> ColumnPairs {
    let mut pairs = ColumnPairs::new();
    let is_row_id = |name: &str| name.eq_ignore_ascii_case(primary_key);

    pair_mapped_and_matching(&mut pairs, source, target, mapping, is_row_id);

    for key in compound_key {
        if let (Some(s), Some(t)) = (find_column_ci(source, key), find_column_ci(target, key)) {
            push_pair(&mut pairs, s, t);
        }
    }
    pairs
}

/// Look up the pair whose source column is `name`, ignoring case.
pub fn find_pair<'a>(pairs: &'a ColumnPairs, name: &str) -> Option<(&'a str, &'a str)> {
    pairs
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(name))
        .map(|(s, t)| (s.as_str(), t.as_str()))
}
