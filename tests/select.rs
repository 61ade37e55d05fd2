//! SELECT end-to-end tests over delimited fixtures

mod common;

use common::{setup_tickers, TestContext};
use qwery::{Error, Value};

#[test]
fn test_filter_sort_limit() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT Symbol, LastSale FROM '{}' \
         WHERE LastSale < 1.00 AND LastSale IS NOT NULL \
         ORDER BY Symbol DESC LIMIT 5",
        path
    ));
    assert!(rows.len() <= 5);
    let symbols: Vec<&Value> = rows.iter().map(|r| r.get("Symbol").unwrap()).collect();
    assert_eq!(
        symbols,
        [
            &Value::Str("XYZ".into()),
            &Value::Str("QRS".into()),
            &Value::Str("ABC".into())
        ]
    );
    for row in &rows {
        assert_eq!(
            row.get("LastSale").unwrap().compare(&Value::Float(1.0)),
            std::cmp::Ordering::Less
        );
    }
}

#[test]
fn test_null_compares_below_non_null_in_where() {
    let (mut ctx, path) = setup_tickers();
    // The NONE row's LastSale is NULL, which orders below every number.
    let rows = ctx.rows(&format!(
        "SELECT Symbol FROM '{}' WHERE LastSale < 0.10",
        path
    ));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Symbol"), Some(&Value::Str("NONE".into())));
}

#[test]
fn test_nulls_sort_first_ascending() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT Symbol, LastSale FROM '{}' ORDER BY LastSale",
        path
    ));
    assert_eq!(rows[0].get("Symbol"), Some(&Value::Str("NONE".into())));
    assert_eq!(rows[0].get("LastSale"), Some(&Value::Null));
}

#[test]
fn test_select_star() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!("SELECT * FROM '{}'", path));
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].len(), 3);
    assert_eq!(rows[0].get("Sector"), Some(&Value::Str("Tech".into())));
}

#[test]
fn test_keywords_are_case_insensitive() {
    let (mut ctx, path) = setup_tickers();
    let upper = ctx.rows(&format!("SELECT Symbol FROM '{}' LIMIT 2", path));
    let lower = ctx.rows(&format!("select Symbol from '{}' limit 2", path));
    assert_eq!(upper, lower);
}

#[test]
fn test_count_star_with_filter() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT COUNT(*) FROM '{}' WHERE Sector = 'Tech'",
        path
    ));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 1);
    assert_eq!(rows[0].get("COUNT(*)"), Some(&Value::Integer(3)));
}

#[test]
fn test_count_field_skips_nulls() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!("SELECT COUNT(LastSale) FROM '{}'", path));
    assert_eq!(rows[0].get("COUNT(LastSale)"), Some(&Value::Integer(5)));
}

#[test]
fn test_aggregates() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT SUM(LastSale) AS total, MIN(LastSale) AS low, MAX(LastSale) AS high \
         FROM '{}' WHERE Sector = 'Tech'",
        path
    ));
    assert_eq!(rows[0].get("total"), Some(&Value::Float(271.25)));
    assert_eq!(rows[0].get("low"), Some(&Value::Float(0.50)));
    assert_eq!(rows[0].get("high"), Some(&Value::Float(150.25)));
}

#[test]
fn test_group_by_keeps_first_seen_order() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT Sector, COUNT(*) AS n FROM '{}' GROUP BY Sector",
        path
    ));
    let groups: Vec<(String, i64)> = rows
        .iter()
        .map(|r| {
            let Some(Value::Str(sector)) = r.get("Sector") else {
                panic!("missing sector");
            };
            let Some(Value::Integer(n)) = r.get("n") else {
                panic!("missing count");
            };
            (sector.clone(), *n)
        })
        .collect();
    assert_eq!(
        groups,
        [
            ("Tech".to_string(), 3),
            ("Finance".to_string(), 1),
            ("Energy".to_string(), 2)
        ]
    );
}

#[test]
fn test_aggregate_over_empty_input_yields_one_row() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT COUNT(*) FROM '{}' WHERE Sector = 'Nowhere'",
        path
    ));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("COUNT(*)"), Some(&Value::Integer(0)));
}

#[test]
fn test_projection_arithmetic_and_alias() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT Symbol, LastSale * 2 AS doubled FROM '{}' WHERE Symbol = 'AAPL'",
        path
    ));
    assert_eq!(rows[0].get("doubled"), Some(&Value::Float(300.5)));
}

#[test]
fn test_alias_is_not_visible_in_where() {
    let (mut ctx, path) = setup_tickers();
    let err = ctx
        .engine
        .execute_statement(&format!(
            "SELECT LastSale + 1 AS c FROM '{}' WHERE c > 10",
            path
        ))
        .unwrap_err();
    assert!(matches!(err, Error::Resolution(message) if message.contains("c")));
}

#[test]
fn test_like_and_in_filters() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT Symbol FROM '{}' WHERE Symbol LIKE 'A%'",
        path
    ));
    assert_eq!(rows.len(), 2);

    let rows = ctx.rows(&format!(
        "SELECT Symbol FROM '{}' WHERE Sector IN ('Finance', 'Energy')",
        path
    ));
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_tab_delimited_source() {
    let mut ctx = TestContext::new();
    let path = ctx.fixture("data.tsv", "a\tb\n1\thello\n");
    let rows = ctx.rows(&format!("SELECT * FROM '{}'", path));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("a"), Some(&Value::Integer(1)));
    assert_eq!(rows[0].get("b"), Some(&Value::Str("hello".into())));
}

#[test]
fn test_json_array_source() {
    let mut ctx = TestContext::new();
    let path = ctx.fixture(
        "data.json",
        r#"[{"name": "one", "n": 1}, {"name": "two", "n": 2}]"#,
    );
    let rows = ctx.rows(&format!("SELECT * FROM '{}' WHERE n > 1", path));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::Str("two".into())));
}

#[test]
fn test_source_statistics_reported() {
    let (mut ctx, path) = setup_tickers();
    let result = ctx.exec(&format!("SELECT * FROM '{}'", path));
    let statistics = result.statistics.expect("statistics");
    assert!(statistics.bytes_in > 0);
}
