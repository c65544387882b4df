//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use prax_reconcile::engine::SchemaInspector;
use prax_reconcile::sqlite::SqliteDatabase;
use rusqlite::types::Value;

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Open an in-memory database and run `ddl` against it.
pub fn database(ddl: &str) -> SqliteDatabase {
    init_tracing();
    let db = SqliteDatabase::in_memory().expect("open in-memory database");
    db.connection().execute_batch(ddl).expect("apply fixture DDL");
    db
}

pub fn exists(db: &SqliteDatabase, table: &str) -> bool {
    db.table_exists(table).expect("table_exists")
}

pub fn count(db: &SqliteDatabase, table: &str) -> u64 {
    db.row_count(table).expect("row_count")
}

/// Read one text column keyed by `ID`.
pub fn text(db: &SqliteDatabase, table: &str, column: &str, id: i64) -> Option<String> {
    db.connection()
        .query_row(
            &format!("SELECT \"{}\" FROM \"{}\" WHERE \"ID\" = ?1", column, table),
            [id],
            |row| row.get(0),
        )
        .expect("select text column")
}

/// Every table name in the database, sorted.
pub fn tables(db: &SqliteDatabase) -> Vec<String> {
    let mut stmt = db
        .connection()
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .expect("prepare table listing");
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("list tables")
        .collect::<Result<Vec<_>, _>>()
        .expect("read table names");
    names
}

/// Every table with every row, for comparing whole-database state.
pub fn snapshot(db: &SqliteDatabase) -> Vec<(String, Vec<Vec<Value>>)> {
    tables(db)
        .into_iter()
        .map(|table| {
            let mut stmt = db
                .connection()
                .prepare(&format!("SELECT * FROM \"{}\" ORDER BY 1", table))
                .expect("prepare snapshot");
            let width = stmt.column_count();
            let rows = stmt
                .query_map([], |row| {
                    (0..width)
                        .map(|i| row.get::<_, Value>(i))
                        .collect::<rusqlite::Result<Vec<_>>>()
                })
                .expect("snapshot rows")
                .collect::<Result<Vec<_>, _>>()
                .expect("read snapshot rows");
            (table, rows)
        })
        .collect()
}

/// Block tables of a versioned content model: a deprecated banner block and
/// the hero block replacing it, plus the shared element base table.
pub const BLOCK_SCHEMA: &str = r#"
CREATE TABLE "Element" ("ID" INTEGER PRIMARY KEY, "ClassName" TEXT, "Style" TEXT);
CREATE TABLE "Element_Live" ("ID" INTEGER PRIMARY KEY, "ClassName" TEXT, "Style" TEXT);

CREATE TABLE "BlockBanner" ("ID" INTEGER PRIMARY KEY, "BannerTitle" TEXT, "Image" TEXT);
CREATE TABLE "BlockBanner_Live" ("ID" INTEGER PRIMARY KEY, "BannerTitle" TEXT, "Image" TEXT);
CREATE TABLE "BlockBanner_Versions" (
    "ID" INTEGER PRIMARY KEY,
    "RecordID" INTEGER NOT NULL,
    "Version" INTEGER NOT NULL,
    "BannerTitle" TEXT,
    "Image" TEXT
);

CREATE TABLE "BlockHero" ("ID" INTEGER PRIMARY KEY, "Title" TEXT, "Image" TEXT, "Layout" TEXT);
CREATE TABLE "BlockHero_Live" ("ID" INTEGER PRIMARY KEY, "Title" TEXT, "Image" TEXT, "Layout" TEXT);
CREATE TABLE "BlockHero_Versions" (
    "ID" INTEGER PRIMARY KEY,
    "RecordID" INTEGER NOT NULL,
    "Version" INTEGER NOT NULL,
    "Title" TEXT,
    "Image" TEXT,
    "Layout" TEXT
);
"#;

/// Four banners (IDs 1-4) and two heroes (IDs 10-11) with history.
pub const BLOCK_DATA: &str = r#"
INSERT INTO "Element" ("ID", "ClassName", "Style") VALUES
    (1, 'Banner', NULL), (2, 'Banner', ''), (3, 'Banner', NULL), (4, 'Banner', NULL),
    (10, 'Hero', NULL), (11, 'Hero', 'wide');
INSERT INTO "Element_Live" SELECT * FROM "Element";

INSERT INTO "BlockBanner" ("ID", "BannerTitle", "Image") VALUES
    (1, 'Spring sale', 'spring.jpg'), (2, 'Summer sale', 'summer.jpg'),
    (3, 'Autumn sale', 'autumn.jpg'), (4, 'Winter sale', 'winter.jpg');
INSERT INTO "BlockBanner_Live" SELECT * FROM "BlockBanner";
INSERT INTO "BlockBanner_Versions" ("ID", "RecordID", "Version", "BannerTitle", "Image") VALUES
    (1, 1, 1, 'Spring', 'spring.jpg'), (2, 1, 2, 'Spring sale', 'spring.jpg'),
    (3, 2, 1, 'Summer sale', 'summer.jpg'), (4, 3, 1, 'Autumn sale', 'autumn.jpg'),
    (5, 4, 1, 'Winter sale', 'winter.jpg');

INSERT INTO "BlockHero" ("ID", "Title", "Image", "Layout") VALUES
    (10, 'Welcome', 'welcome.jpg', 'full'), (11, 'About us', 'about.jpg', 'split');
INSERT INTO "BlockHero_Live" SELECT * FROM "BlockHero";
INSERT INTO "BlockHero_Versions" ("ID", "RecordID", "Version", "Title", "Image", "Layout") VALUES
    (1, 10, 1, 'Welcome', 'welcome.jpg', 'full'), (2, 10, 2, 'Welcome', 'welcome.jpg', 'full'),
    (3, 11, 1, 'About us', 'about.jpg', 'split');
"#;

pub fn block_database() -> SqliteDatabase {
    database(&format!("{}{}", BLOCK_SCHEMA, BLOCK_DATA))
}
