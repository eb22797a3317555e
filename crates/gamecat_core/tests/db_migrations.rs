use gamecat_core::db::migrations::latest_version;
use gamecat_core::db::{open_db, open_db_shared_memory, DbError};
use rusqlite::Connection;

#[test]
fn shared_memory_db_applies_all_migrations() {
    let conn = open_db_shared_memory("db-migrations-memory").unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "favorite_games");
    assert_index_exists(&conn, "idx_favorite_games_added_at");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GameCatalogue.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO favorite_games (game_id, name, rating, added_at) VALUES (1, 'Celeste', 4.5, 10);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let rows: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM favorite_games;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn file_db_uses_wal_journal() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("wal.sqlite3")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn schema_rejects_invalid_favorites() {
    let conn = open_db_shared_memory("db-migrations-checks").unwrap();

    let blank_name = conn.execute(
        "INSERT INTO favorite_games (game_id, name, rating, added_at) VALUES (1, '  ', 4.0, 1);",
        [],
    );
    assert!(blank_name.is_err());

    let bad_rating = conn.execute(
        "INSERT INTO favorite_games (game_id, name, rating, added_at) VALUES (2, 'Hades', 9.0, 1);",
        [],
    );
    assert!(bad_rating.is_err());
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

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
