#![cfg(feature = "mssql")]

use mssql_bridge::prelude::*;

async fn read_only_handler() -> MssqlHandler {
    let strings = ConnectionStrings::default();
    MssqlHandler::connect(strings.get(Environment::Prod), true)
        .await
        .unwrap()
}

#[tokio::test]
async fn mutating_calls_are_refused_before_any_connection_is_opened() {
    // the default prod entry points at a host that does not exist, so these
    // tests only pass because the gate fires before the pool is touched
    let db = read_only_handler().await;

    let err = db.execute("DELETE FROM t", &[]).await.unwrap_err();
    assert!(err.is_read_only());

    let rows = vec![vec![RowValues::Int(1)]];
    let err = db
        .iter_execute("INSERT INTO t (id) VALUES (?)", &rows, BatchErrorMode::Abort)
        .await
        .unwrap_err();
    assert!(err.is_read_only());

    let data = TableData::new(vec!["id".into()], vec![vec![RowValues::Int(1)]]).unwrap();
    let err = db
        .bulk_insert("t", &data, &BulkInsertOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_read_only());
}

#[tokio::test]
async fn refusal_names_the_operation() {
    let db = read_only_handler().await;
    let err = db.execute("DELETE FROM t", &[]).await.unwrap_err();
    assert!(err.to_string().contains("execute"));
}

#[tokio::test]
async fn parameter_mismatch_is_caught_before_connecting() {
    let strings = ConnectionStrings::default();
    let db = MssqlHandler::connect(strings.get(Environment::Dev), false)
        .await
        .unwrap();

    // two markers, one value
    let err = db
        .query("SELECT * FROM t WHERE a = ? AND b = ?", &[RowValues::Int(1)])
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::ParameterError(_)));

    // same check through the bundled form
    let qp = QueryAndParams::new("SELECT * FROM t WHERE a = ?", vec![]);
    let err = db.query_qp(&qp).await.unwrap_err();
    assert!(matches!(err, BridgeError::ParameterError(_)));
}

#[tokio::test]
async fn iter_execute_requires_markers() {
    let strings = ConnectionStrings::default();
    let db = MssqlHandler::connect(strings.get(Environment::Dev), false)
        .await
        .unwrap();

    let err = db
        .iter_execute("DELETE FROM t", &[vec![]], BatchErrorMode::Continue)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::ParameterError(_)));
}
