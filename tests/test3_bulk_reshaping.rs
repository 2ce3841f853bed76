use mssql_bridge::markers::MarkerStyle;
use mssql_bridge::prelude::*;
use mssql_bridge::statement::build_insert;

fn orders() -> TableData {
    TableData::new(
        vec!["order_id".into(), "customer".into(), "note".into()],
        vec![
            vec![
                RowValues::Int(1),
                RowValues::Text("acme".into()),
                RowValues::Text("rush".into()),
            ],
            vec![RowValues::Int(2), RowValues::Text("initech".into()), RowValues::Null],
            vec![RowValues::Int(3), RowValues::Null, RowValues::Null],
        ],
    )
    .unwrap()
}

#[test]
fn split_policy_produces_the_two_pass_shape() {
    let passes = NullPolicy::SplitOnColumn("note".into()).apply(&orders()).unwrap();
    assert_eq!(passes.len(), 2);

    // first pass: rows with a note; second pass: rows without one
    assert_eq!(passes[0].row_count(), 1);
    assert_eq!(passes[1].row_count(), 2);

    // both passes keep the full column list so one INSERT shape serves both
    let first = build_insert("orders", passes[0].columns(), passes[0].row_count(), MarkerStyle::AtP);
    let second =
        build_insert("orders", passes[1].columns(), passes[1].row_count(), MarkerStyle::AtP);
    assert_eq!(
        first,
        "INSERT INTO [orders] ([order_id], [customer], [note]) VALUES (@P1, @P2, @P3);"
    );
    assert!(second.ends_with("VALUES (@P1, @P2, @P3), (@P4, @P5, @P6);"));
}

#[test]
fn fill_text_then_drop_interact_as_documented() {
    let data = orders();

    let filled = NullPolicy::FillTextColumns.apply(&data).unwrap();
    let rows = filled[0].rows();
    assert_eq!(rows[1][2], RowValues::Text(String::new()));
    assert_eq!(rows[2][1], RowValues::Text(String::new()));

    // dropping nulls afterwards keeps everything, since text nulls were filled
    let dropped = NullPolicy::DropNullRows.apply(&filled[0]).unwrap();
    assert_eq!(dropped[0].row_count(), 3);

    // dropping nulls on the raw data loses the incomplete rows instead
    let dropped_raw = NullPolicy::DropNullRows.apply(&data).unwrap();
    assert_eq!(dropped_raw[0].row_count(), 1);
}

#[test]
fn preserve_is_the_default_policy() {
    let options = BulkInsertOptions::default();
    assert_eq!(options.null_policy, NullPolicy::Preserve);
    assert!(!options.identity_insert);

    let passes = options.null_policy.apply(&orders()).unwrap();
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0], orders());
}

#[test]
fn statement_markers_round_trip_for_both_backends() {
    let (at_sql, at_count) =
        prepare_markers("UPDATE o SET note = ? WHERE order_id = ?", MarkerStyle::AtP);
    assert_eq!(at_sql, "UPDATE o SET note = @P1 WHERE order_id = @P2");
    assert_eq!(at_count, 2);

    let (q_sql, q_count) =
        prepare_markers("UPDATE o SET note = ? WHERE order_id = ?", MarkerStyle::Question);
    assert_eq!(q_sql, "UPDATE o SET note = ? WHERE order_id = ?");
    assert_eq!(q_count, 2);
}
