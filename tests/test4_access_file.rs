#![cfg(feature = "access")]

use std::io::Write;

use mssql_bridge::prelude::*;

fn fake_database(dir: &std::path::Path, name: &str, bytes: &[u8]) {
    let mut f = std::fs::File::create(dir.join(name)).unwrap();
    f.write_all(bytes).unwrap();
}

#[test]
fn open_captures_file_metadata() {
    let dir = tempfile::tempdir().unwrap();
    fake_database(dir.path(), "inventory.accdb", b"not really a database");

    let db = AccessDb::open(dir.path(), "inventory.accdb", None).unwrap();
    assert_eq!(db.size_bytes(), b"not really a database".len() as u64);
    assert!(db.path().ends_with("inventory.accdb"));
    // the timestamp is from just now
    let age = chrono::Local::now().signed_duration_since(db.modified());
    assert!(age.num_seconds() < 60, "stale modification time: {age}");
}

#[test]
fn open_builds_the_access_driver_connection_string() {
    let dir = tempfile::tempdir().unwrap();
    fake_database(dir.path(), "inventory.accdb", b"x");

    let db = AccessDb::open(dir.path(), "inventory.accdb", None).unwrap();
    let cs = db.handler().connection_string();
    assert!(cs.starts_with("Driver={Microsoft Access Driver (*.mdb, *.accdb)};DBQ="));
    assert!(cs.contains("inventory.accdb"));
    assert!(!cs.contains("PWD="));

    let locked = AccessDb::open(dir.path(), "inventory.accdb", Some("hunter2")).unwrap();
    assert!(locked.handler().connection_string().ends_with("PWD=hunter2;"));
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AccessDb::open(dir.path(), "absent.accdb", None).unwrap_err();
    assert!(matches!(err, BridgeError::ConfigError(_)));
}

#[tokio::test]
async fn view_definitions_are_not_available() {
    let dir = tempfile::tempdir().unwrap();
    fake_database(dir.path(), "inventory.accdb", b"x");

    let db = AccessDb::open(dir.path(), "inventory.accdb", None).unwrap();
    let err = db.view_definition("anything").await.unwrap_err();
    assert!(matches!(err, BridgeError::Unimplemented(_)));
}

#[tokio::test]
async fn read_only_odbc_handles_refuse_writes_without_a_driver() {
    let handler = OdbcHandler::new("DSN=nonexistent", true);
    let err = handler.execute("DELETE FROM t", &[]).await.unwrap_err();
    assert!(err.is_read_only());

    let data = TableData::new(vec!["id".into()], vec![vec![RowValues::Int(1)]]).unwrap();
    let err = handler
        .bulk_insert("t", &data, &BulkInsertOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_read_only());
}
