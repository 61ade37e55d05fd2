//! Views, DESCRIBE, function-call statements, and variable expansion

mod common;

use common::{setup_tickers, TICKERS_CSV};
use qwery::Value;

#[test]
fn test_create_view_and_select_from_it() {
    let (mut ctx, path) = setup_tickers();
    let results = ctx
        .engine
        .execute(&format!(
            "CREATE VIEW tech AS SELECT * FROM '{}' WHERE Sector = 'Tech'; \
             SELECT Symbol FROM tech",
            path
        ))
        .unwrap();
    assert_eq!(results.len(), 2);
    let rows = results
        .into_iter()
        .nth(1)
        .unwrap()
        .collect_rows()
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.get("Symbol").is_some()));
}

#[test]
fn test_view_composes_with_clauses() {
    let (mut ctx, path) = setup_tickers();
    ctx.exec(&format!(
        "CREATE VIEW tech AS SELECT * FROM '{}' WHERE Sector = 'Tech'",
        path
    ));
    let rows = ctx.rows("SELECT Symbol FROM tech WHERE LastSale < 1.00 ORDER BY Symbol");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Symbol"), Some(&Value::Str("ABC".into())));
}

#[test]
fn test_view_over_view() {
    let (mut ctx, path) = setup_tickers();
    ctx.exec(&format!("CREATE VIEW all_rows AS SELECT * FROM '{}'", path));
    ctx.exec("CREATE VIEW tech AS SELECT Symbol FROM all_rows WHERE Sector = 'Tech'");
    let rows = ctx.rows("SELECT COUNT(*) FROM tech");
    assert_eq!(rows[0].get("COUNT(*)"), Some(&Value::Integer(3)));
}

#[test]
fn test_describe_reports_columns() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!("DESCRIBE '{}'", path));
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("column"), Some(&Value::Str("Symbol".into())));
    assert_eq!(rows[0].get("type"), Some(&Value::Str("string".into())));
    assert_eq!(rows[1].get("column"), Some(&Value::Str("LastSale".into())));
    assert_eq!(rows[1].get("type"), Some(&Value::Str("float".into())));
}

#[test]
fn test_function_call_statement() {
    let (mut ctx, _) = setup_tickers();
    let rows = ctx.rows("NOW()");
    assert_eq!(rows.len(), 1);
    assert!(matches!(
        rows[0].get("NOW()"),
        Some(Value::Timestamp(_))
    ));
}

#[test]
fn test_path_variable_expansion() {
    let (mut ctx, path) = setup_tickers();
    let dir = std::path::Path::new(&path)
        .parent()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    ctx.engine.define("dir", Value::Str(dir));
    let rows = ctx.rows("SELECT Symbol FROM '${dir}/tickers.csv' LIMIT 1");
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_scalar_subquery_in_condition() {
    let (mut ctx, path) = setup_tickers();
    let rows = ctx.rows(&format!(
        "SELECT Symbol FROM '{path}' WHERE LastSale = (SELECT MAX(LastSale) FROM '{path}')",
        path = path
    ));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Symbol"), Some(&Value::Str("AAPL".into())));
}

#[test]
fn test_fixture_shape() {
    // The shared fixture the tests above lean on: 6 rows, 3 columns.
    assert_eq!(TICKERS_CSV.lines().count(), 7);
}
