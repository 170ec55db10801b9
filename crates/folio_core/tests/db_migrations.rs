use folio_core::db::migrations::latest_version;
use folio_core::db::{open_db, open_db_in_memory, DbError};
use folio_core::store::{SqliteBackend, StoreError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "portfolio_items");
    assert_table_exists(&conn, "site_settings");
    assert_table_exists(&conn, "hero_settings");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "portfolio_items");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn backend_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteBackend::try_new(conn).err().unwrap();
    assert!(matches!(
        err,
        StoreError::Db(DbError::SchemaMismatch {
            actual_version: 0,
            ..
        })
    ));
}

#[test]
fn settings_tables_hold_a_single_row() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO hero_settings (id, text_color) VALUES (1, '#000');", [])
        .unwrap();

    let err = conn
        .execute("INSERT INTO hero_settings (id, text_color) VALUES (2, '#fff');", [])
        .unwrap_err();
    assert!(err.to_string().contains("CHECK"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
