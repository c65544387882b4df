//! Integration tests for the post-sync merge stage against SQLite.

mod common;

use pretty_assertions::assert_eq;
use prax_reconcile::engine::{
    DiagnosticKind, DiagnosticLevel, Diagnostics, MergeOutcome, RemapTable, TableMergeEngine,
};
use prax_reconcile::prelude::*;

use common::{block_database, count, database, exists, snapshot, tables, text};

fn banner_rule() -> TableMergeRule {
    TableMergeRule::new("BlockBanner", "BlockHero")
        .map_column("BannerTitle", "Title")
        .marker(MarkerSpec::new("Element", "Style", "banner-style"))
        .versioned(true)
}

fn banner_rules() -> RuleSet {
    RuleSet::new().merge(banner_rule())
}

fn history_titles(db: &SqliteDatabase, record_id: i64) -> Vec<(i64, String)> {
    let mut stmt = db
        .connection()
        .prepare(
            "SELECT \"Version\", \"Title\" FROM \"BlockHero_Versions\" \
             WHERE \"RecordID\" = ?1 ORDER BY \"Version\"",
        )
        .unwrap();
    let rows = stmt
        .query_map([record_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

/// Scenario D.
#[test]
fn test_merge_versioned_block() {
    let db = block_database();

    let report = Reconciler::new(&db).post_sync(&banner_rules()).unwrap();

    assert_eq!(report.tables_merged, 1);
    assert!(!report.has_errors());

    // Main and live tables gained the four banners.
    assert_eq!(count(&db, "BlockHero"), 6);
    assert_eq!(count(&db, "BlockHero_Live"), 6);
    assert_eq!(text(&db, "BlockHero", "Title", 1).as_deref(), Some("Spring sale"));
    assert_eq!(text(&db, "BlockHero", "Image", 4).as_deref(), Some("winter.jpg"));
    assert_eq!(text(&db, "BlockHero", "Layout", 4), None);
    assert_eq!(text(&db, "BlockHero", "Title", 10).as_deref(), Some("Welcome"));
    assert_eq!(text(&db, "BlockHero_Live", "Title", 3).as_deref(), Some("Autumn sale"));

    // History rows were appended under fresh row ids.
    assert_eq!(count(&db, "BlockHero_Versions"), 8);
    assert_eq!(
        history_titles(&db, 1),
        vec![(1, "Spring".to_string()), (2, "Spring sale".to_string())]
    );
    assert_eq!(history_titles(&db, 10).len(), 2);

    // Only migrated rows were stamped.
    for id in 1..=4 {
        assert_eq!(text(&db, "Element", "Style", id).as_deref(), Some("banner-style"));
        assert_eq!(text(&db, "Element_Live", "Style", id).as_deref(), Some("banner-style"));
    }
    assert_eq!(text(&db, "Element", "Style", 10), None);
    assert_eq!(text(&db, "Element", "Style", 11).as_deref(), Some("wide"));

    // Deprecated tables were set aside, never dropped.
    for table in ["BlockBanner", "BlockBanner_Live", "BlockBanner_Versions"] {
        assert!(!exists(&db, table), "{} should be archived", table);
    }
    assert_eq!(count(&db, "_obsolete_BlockBanner"), 4);
    assert_eq!(count(&db, "_obsolete_BlockBanner_Live"), 4);
    assert_eq!(count(&db, "_obsolete_BlockBanner_Versions"), 5);

    let archived = report
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Archived)
        .count();
    assert_eq!(archived, 3);
}

/// Scenario E.
#[test]
fn test_merge_rerun_is_noop() {
    let db = block_database();
    let reconciler = Reconciler::new(&db);
    reconciler.post_sync(&banner_rules()).unwrap();
    let before = snapshot(&db);

    let report = reconciler.post_sync(&banner_rules()).unwrap();

    assert_eq!(snapshot(&db), before);
    assert!(!report.has_changes());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::NothingToDo);
    assert_eq!(report.diagnostics[0].level, DiagnosticLevel::Notice);
    assert_eq!(report.summary(), "Nothing to do");
}

#[test]
fn test_reconciles_when_every_key_overlaps() {
    let db = block_database();
    db.connection()
        .execute_batch(
            r#"INSERT INTO "BlockHero" ("ID", "Title", "Image") VALUES
                (1, 'stale', NULL), (2, 'stale', NULL), (3, 'stale', NULL), (4, 'stale', NULL);"#,
        )
        .unwrap();
    let rule = TableMergeRule::new("BlockBanner", "BlockHero").map_column("BannerTitle", "Title");
    let mut diagnostics = Diagnostics::new();

    let outcome = TableMergeEngine::new(&db)
        .merge_one(&rule, &mut diagnostics)
        .unwrap();

    let MergeOutcome::Merged(stats) = outcome else {
        panic!("expected a merge, got {:?}", outcome);
    };
    assert_eq!(stats.main.inserted, 0);
    assert_eq!(stats.main.reconciled, 4);
    assert_eq!(count(&db, "BlockHero"), 6);
    assert_eq!(text(&db, "BlockHero", "Title", 2).as_deref(), Some("Summer sale"));
    assert_eq!(text(&db, "BlockHero", "Image", 2).as_deref(), Some("summer.jpg"));
    assert_eq!(text(&db, "BlockHero", "Title", 11).as_deref(), Some("About us"));
}

#[test]
fn test_partial_overlap_left_alone_by_default() {
    let db = block_database();
    db.connection()
        .execute(
            "INSERT INTO \"BlockHero\" (\"ID\", \"Title\") VALUES (1, 'kept')",
            [],
        )
        .unwrap();
    let mut diagnostics = Diagnostics::new();

    let outcome = TableMergeEngine::new(&db)
        .merge_one(&banner_rule(), &mut diagnostics)
        .unwrap();

    let MergeOutcome::Merged(stats) = outcome else {
        panic!("expected a merge, got {:?}", outcome);
    };
    assert_eq!(stats.main.inserted, 3);
    assert_eq!(stats.main.reconciled, 0);
    assert_eq!(text(&db, "BlockHero", "Title", 1).as_deref(), Some("kept"));
}

#[test]
fn test_partial_overlap_reconciled_when_always() {
    let db = block_database();
    db.connection()
        .execute(
            "INSERT INTO \"BlockHero\" (\"ID\", \"Title\") VALUES (1, 'stale')",
            [],
        )
        .unwrap();
    let rules = banner_rules().options(MergeOptions::new().reconcile(OverlapReconcile::Always));

    let report = Reconciler::new(&db).post_sync(&rules).unwrap();

    assert_eq!(report.tables_merged, 1);
    assert_eq!(count(&db, "BlockHero"), 6);
    assert_eq!(text(&db, "BlockHero", "Title", 1).as_deref(), Some("Spring sale"));
    assert_eq!(text(&db, "BlockHero", "Title", 10).as_deref(), Some("Welcome"));
}

#[test]
fn test_marker_never_clobbers_existing_value() {
    let db = block_database();
    db.connection()
        .execute("UPDATE \"Element\" SET \"Style\" = 'custom' WHERE \"ID\" = 3", [])
        .unwrap();

    Reconciler::new(&db).post_sync(&banner_rules()).unwrap();

    assert_eq!(text(&db, "Element", "Style", 2).as_deref(), Some("banner-style"));
    assert_eq!(text(&db, "Element", "Style", 3).as_deref(), Some("custom"));
    assert_eq!(text(&db, "Element_Live", "Style", 3).as_deref(), Some("banner-style"));
}

#[test]
fn test_incompatible_tables_left_intact() {
    let db = database(
        r#"
        CREATE TABLE "BlockQuote" ("Quote" TEXT, "Author" TEXT);
        INSERT INTO "BlockQuote" VALUES ('To be', 'Hamlet');
        CREATE TABLE "BlockHero" ("ID" INTEGER PRIMARY KEY, "Title" TEXT);
        INSERT INTO "BlockHero" VALUES (1, 'Welcome');
        "#,
    );
    let before = snapshot(&db);
    let rules = RuleSet::new().merge(TableMergeRule::new("BlockQuote", "BlockHero"));

    let report = Reconciler::new(&db).post_sync(&rules).unwrap();

    assert_eq!(report.tables_merged, 0);
    assert_eq!(snapshot(&db), before);
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::SchemaIncompatibility)
    );
}

#[test]
fn test_no_shared_primary_key_left_intact() {
    let db = database(
        r#"
        CREATE TABLE "BlockQuote" ("Title" TEXT);
        INSERT INTO "BlockQuote" VALUES ('To be');
        CREATE TABLE "BlockHero" ("ID" INTEGER PRIMARY KEY, "Title" TEXT);
        "#,
    );
    let mut diagnostics = Diagnostics::new();

    let outcome = TableMergeEngine::new(&db)
        .merge_one(&TableMergeRule::new("BlockQuote", "BlockHero"), &mut diagnostics)
        .unwrap();

    assert_eq!(outcome, MergeOutcome::Incompatible);
    assert!(exists(&db, "BlockQuote"));
    assert_eq!(count(&db, "BlockHero"), 0);
}

#[test]
fn test_missing_target_waits_for_schema_sync() {
    let db = block_database();
    let before = snapshot(&db);
    let rules = RuleSet::new().merge(TableMergeRule::new("BlockBanner", "BlockCarousel"));

    let report = Reconciler::new(&db).post_sync(&rules).unwrap();

    assert_eq!(snapshot(&db), before);
    assert!(!report.has_errors());
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ConfigurationGap);
    assert!(report.diagnostics[0].message.contains("'BlockCarousel'"));
}

#[test]
fn test_missing_sibling_target_keeps_sibling() {
    let db = block_database();
    db.connection()
        .execute_batch("DROP TABLE \"BlockHero_Live\";")
        .unwrap();

    let report = Reconciler::new(&db).post_sync(&banner_rules()).unwrap();

    assert_eq!(report.tables_merged, 1);
    assert!(exists(&db, "BlockBanner_Live"));
    assert!(exists(&db, "_obsolete_BlockBanner"));
    assert!(exists(&db, "_obsolete_BlockBanner_Versions"));
    assert_eq!(text(&db, "Element_Live", "Style", 1), None);
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::ConfigurationGap
                && d.message.contains("BlockHero_Live"))
    );
}

#[test]
fn test_empty_source_is_archived() {
    let db = block_database();
    db.connection()
        .execute_batch(
            r#"DELETE FROM "BlockBanner"; DELETE FROM "BlockBanner_Live";
               DELETE FROM "BlockBanner_Versions";"#,
        )
        .unwrap();
    let mut diagnostics = Diagnostics::new();

    let outcome = TableMergeEngine::new(&db)
        .merge_one(&banner_rule(), &mut diagnostics)
        .unwrap();

    assert_eq!(
        outcome,
        MergeOutcome::ArchivedEmpty {
            archived: vec![
                "_obsolete_BlockBanner".to_string(),
                "_obsolete_BlockBanner_Live".to_string(),
                "_obsolete_BlockBanner_Versions".to_string(),
            ],
        }
    );
    assert_eq!(count(&db, "BlockHero"), 2);
    assert_eq!(text(&db, "Element", "Style", 1), None);
}

#[test]
fn test_archive_names_stay_unique() {
    let db = block_database();
    db.connection()
        .execute_batch(
            r#"CREATE TABLE "_obsolete_BlockBanner" ("ID" INTEGER PRIMARY KEY);
               INSERT INTO "_obsolete_BlockBanner" VALUES (99);"#,
        )
        .unwrap();

    Reconciler::new(&db).post_sync(&banner_rules()).unwrap();

    assert_eq!(count(&db, "_obsolete_BlockBanner"), 1);
    assert_eq!(count(&db, "_obsolete_BlockBanner_2"), 4);
    assert!(!exists(&db, "BlockBanner"));
}

#[test]
fn test_full_run_from_rule_file_is_idempotent() {
    let db = database(&format!(
        "{}{}{}",
        common::BLOCK_SCHEMA,
        common::BLOCK_DATA,
        r#"CREATE TABLE "Note" ("ID" INTEGER PRIMARY KEY, "Heading" TEXT);
           INSERT INTO "Note" VALUES (1, 'Remember');"#,
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reconcile.toml");
    std::fs::write(
        &path,
        r#"
[discriminators]
"Banner" = "Hero"

[tables]
Note = "Memo"

[columns.Memo]
Heading = "Title"

[[merges]]
source = "BlockBanner"
target = "BlockHero"
versioned = true

[merges.columns]
BannerTitle = "Title"

[merges.marker]
table = "Element"
column = "Style"
value = "banner-style"
"#,
    )
    .unwrap();
    let rules = RuleSet::load(&path).unwrap();
    let reconciler = Reconciler::new(&db);

    let run = || {
        let mut remap = RemapTable::new();
        let before = reconciler.pre_sync(&rules, &mut remap).unwrap();
        let after = reconciler.post_sync(&rules).unwrap();
        (remap, before, after)
    };

    let (remap, before, after) = run();
    assert_eq!(remap.get("Banner").map(String::as_str), Some("Hero"));
    assert_eq!(before.tables_renamed, 1);
    assert_eq!(before.columns_renamed, 1);
    assert_eq!(after.tables_merged, 1);
    assert_eq!(text(&db, "Memo", "Title", 1).as_deref(), Some("Remember"));
    let reconciled = snapshot(&db);

    let (_, before, after) = run();
    assert_eq!(snapshot(&db), reconciled);
    assert_eq!(before.tables_renamed + before.columns_renamed, 0);
    assert!(!after.has_changes());
    assert!(!tables(&db).contains(&"_obsolete_BlockBanner_2".to_string()));
}
