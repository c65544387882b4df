//! SQL generation for the merge stage.
//!
//! Every statement is a single portable DML statement. Identifiers are
//! quoted through the [`Dialect`]; literal values are always bound.

use crate::dialect::Dialect;
use crate::pairs::ColumnPairs;

/// A `(source column, target column)` key pair used to match rows.
pub type KeyPair<'a> = (&'a str, &'a str);

/// Generate `SELECT COUNT(*)` for a table.
pub fn count_rows(dialect: Dialect, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", dialect.quote(table))
}

/// Generate an insert of every source row whose key is not yet present in
/// the target.
///
/// Rows are matched on all of `keys` together (a left anti-join), so an
/// existing target row is never touched.
///
/// # Panics
///
/// Panics if `keys` is empty.
pub fn insert_missing(
    dialect: Dialect,
    source: &str,
    target: &str,
    pairs: &ColumnPairs,
    keys: &[KeyPair<'_>],
) -> String {
    let q = |ident: &str| dialect.quote(ident);
    let target_cols: Vec<String> = pairs.values().map(|c| q(c)).collect();
    let source_cols: Vec<String> = pairs.keys().map(|c| format!("src.{}", q(c))).collect();
    let join: Vec<String> = keys
        .iter()
        .map(|(s, t)| format!("dst.{} = src.{}", q(t), q(s)))
        .collect();
    let (_, first_target_key) = keys[0];

    format!(
        "INSERT INTO {} ({}) SELECT {} FROM {} AS src \
         LEFT JOIN {} AS dst ON {} WHERE dst.{} IS NULL",
        q(target),
        target_cols.join(", "),
        source_cols.join(", "),
        q(source),
        q(target),
        join.join(" AND "),
        q(first_target_key)
    )
}

/// Generate an update that copies every non-key paired column from source
/// rows onto target rows with the same key.
///
/// Returns `None` when the key is the only pair.
pub fn update_from_source(
    dialect: Dialect,
    source: &str,
    target: &str,
    pairs: &ColumnPairs,
    key: KeyPair<'_>,
) -> Option<String> {
    let q = |ident: &str| dialect.quote(ident);
    let (source_key, target_key) = key;
    let matches = format!(
        "{}.{} = {}.{}",
        q(source),
        q(source_key),
        q(target),
        q(target_key)
    );

    let assignments: Vec<String> = pairs
        .iter()
        .filter(|(s, t)| s.as_str() != source_key && t.as_str() != target_key)
        .map(|(s, t)| {
            format!(
                "{} = (SELECT {}.{} FROM {} WHERE {})",
                q(t),
                q(source),
                q(s),
                q(source),
                matches
            )
        })
        .collect();

    if assignments.is_empty() {
        return None;
    }

    Some(format!(
        "UPDATE {} SET {} WHERE {} IN (SELECT {} FROM {})",
        q(target),
        assignments.join(", "),
        q(target_key),
        q(source_key),
        q(source)
    ))
}

/// Generate the marker stamp: set `column` to a bound value on every row of
/// `table` keyed by a row of `source`, unless it already holds a value.
pub fn stamp_marker(
    dialect: Dialect,
    table: &str,
    column: &str,
    table_key: &str,
    source: &str,
    source_key: &str,
) -> String {
    let q = |ident: &str| dialect.quote(ident);
    format!(
        "UPDATE {} SET {} = {} WHERE {} IN (SELECT {} FROM {}) AND ({} IS NULL OR {} = '')",
        q(table),
        q(column),
        dialect.placeholder(1),
        q(table_key),
        q(source_key),
        q(source),
        q(column),
        q(column)
    )
}
