use contacts_core::db::migrations::latest_version;
use contacts_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "contacts");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO contacts (id, first_name, surname, username, email)
             VALUES ('7e8377af-bdc3-4b9e-a491-2d9ddff3253f', 'a', 'b', 'username1', 'a@b.co');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let rows: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

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
fn schema_enforces_case_insensitive_uniqueness() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO contacts (id, first_name, surname, username, email)
         VALUES ('11111111-2222-4333-8444-555555555555', 'a', 'b', 'username1', 'one@b.co');",
        [],
    )
    .unwrap();

    let username_clash = conn.execute(
        "INSERT INTO contacts (id, first_name, surname, username, email)
         VALUES ('21111111-2222-4333-8444-555555555555', 'a', 'b', 'USERNAME1', 'two@b.co');",
        [],
    );
    assert!(username_clash.is_err());

    let email_clash = conn.execute(
        "INSERT INTO contacts (id, first_name, surname, username, email)
         VALUES ('31111111-2222-4333-8444-555555555555', 'a', 'b', 'username2', 'ONE@B.CO');",
        [],
    );
    assert!(email_clash.is_err());
}

#[test]
fn schema_rejects_out_of_range_lengths() {
    let conn = open_db_in_memory().unwrap();
    let too_long_username = "a".repeat(33);
    let result = conn.execute(
        "INSERT INTO contacts (id, first_name, surname, username, email)
         VALUES ('11111111-2222-4333-8444-555555555555', 'a', 'b', ?1, 'one@b.co');",
        [too_long_username],
    );
    assert!(result.is_err());
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
