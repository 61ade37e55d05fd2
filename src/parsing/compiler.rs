//! Statement compiler
//!
//! Picks a template per leading keyword, runs the template parser, and
//! assembles the matching [`Executable`] from the extraction bag. Scripts
//! are semicolon-separated statement sequences.

use super::lexer::{TokenKind, TokenStream};
use super::{expression, template};
use crate::error::{Error, Result};
use crate::execution::{Call, CreateView, Describe, Executable, Insert, Select};
use crate::sources::{DataResource, LiteralSource};

const SELECT_TEMPLATE: &str =
    "SELECT @{fields} FROM @source ?WHERE @<condition> ?GROUP +?BY @(groupFields) ?ORDER +?BY @|sortFields| ?LIMIT @limit";

const INSERT_TEMPLATE: &str =
    "INSERT ?OVERWRITE INTO @target ( @(fields) ) VALUES ( @[values] )";

const CREATE_VIEW_TEMPLATE: &str = "CREATE VIEW @name AS";

const DESCRIBE_TEMPLATE: &str = "DESCRIBE @source";

/// Compiles a script of semicolon-separated statements.
pub fn compile_script(sql: &str) -> Result<Vec<Executable>> {
    let mut ts = TokenStream::tokenize(sql)?;
    let mut statements = Vec::new();
    loop {
        while ts.next_if(";") {}
        if !ts.has_next() {
            return Ok(statements);
        }
        statements.push(compile_statement(&mut ts)?);
        if ts.has_next() {
            ts.expect(";")?;
        }
    }
}

/// Compiles a single statement off the front of the stream.
pub fn compile_statement(ts: &mut TokenStream) -> Result<Executable> {
    let leading = match ts.peek() {
        Some(token) => token.clone(),
        None => return Err(ts.error_here("statement expected")),
    };
    let statement = if leading.is("SELECT") {
        compile_select(ts)?
    } else if leading.is("INSERT") {
        compile_insert(ts)?
    } else if leading.is("CREATE") {
        compile_create_view(ts)?
    } else if leading.is("DESCRIBE") {
        compile_describe(ts)?
    } else if leading.kind == TokenKind::Identifier {
        // A bare function-call statement, e.g. NOW().
        Executable::Call(Call {
            expression: expression::parse_expression(ts)?,
        })
    } else {
        return Err(ts.error_here("unrecognized statement"));
    };
    tracing::debug!(statement = ?statement_kind(&statement), "compiled statement");
    Ok(statement)
}

fn statement_kind(statement: &Executable) -> &'static str {
    match statement {
        Executable::Select(_) => "select",
        Executable::Insert(_) => "insert",
        Executable::CreateView(_) => "create view",
        Executable::Describe(_) => "describe",
        Executable::Call(_) => "call",
    }
}

fn compile_select(ts: &mut TokenStream) -> Result<Executable> {
    let bag = template::extract(ts, SELECT_TEMPLATE)?;
    let limit = bag
        .identifier("limit")
        .map(|text| {
            text.parse::<usize>()
                .map_err(|_| Error::syntax(format!("invalid LIMIT: {}", text)))
        })
        .transpose()?;
    Ok(Executable::Select(Select {
        fields: required(bag.arguments("fields"), "fields")?.to_vec(),
        source: DataResource::new(required(bag.identifier("source"), "source")?),
        condition: bag.condition("condition").cloned(),
        group_by: bag.fields("groupFields").map(<[_]>::to_vec),
        order_by: bag.sort_fields("sortFields").map(<[_]>::to_vec),
        limit,
    }))
}

fn compile_insert(ts: &mut TokenStream) -> Result<Executable> {
    let bag = template::extract(ts, INSERT_TEMPLATE)?;
    let fields = required(bag.fields("fields"), "fields")?.to_vec();
    let mut rows = vec![required(bag.values("values"), "values")?.to_vec()];
    // Additional VALUES tuples: , ( v1, v2, ... ) ...
    while ts.next_if(",") {
        ts.expect("(")?;
        rows.push(template::extract_values(ts)?);
        ts.expect(")")?;
    }
    Ok(Executable::Insert(Insert {
        target: DataResource::new(required(bag.identifier("target"), "target")?),
        source: LiteralSource::new(fields.clone(), rows),
        fields,
        overwrite: bag.identifier("OVERWRITE").is_some(),
    }))
}

fn compile_create_view(ts: &mut TokenStream) -> Result<Executable> {
    let bag = template::extract(ts, CREATE_VIEW_TEMPLATE)?;
    let statement = compile_statement(ts)?;
    Ok(Executable::CreateView(CreateView {
        name: required(bag.identifier("name"), "name")?.to_string(),
        statement: Box::new(statement),
    }))
}

fn compile_describe(ts: &mut TokenStream) -> Result<Executable> {
    let bag = template::extract(ts, DESCRIBE_TEMPLATE)?;
    Ok(Executable::Describe(Describe {
        source: DataResource::new(required(bag.identifier("source"), "source")?),
    }))
}

/// A required slot missing after successful extraction is a template bug.
fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::Internal(format!("template slot missing: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Expression, SortOrder};

    fn compile_one(sql: &str) -> Executable {
        let statements = compile_script(sql).unwrap();
        assert_eq!(statements.len(), 1);
        statements.into_iter().next().unwrap()
    }

    #[test]
    fn test_select_full_clause_set() {
        let statement = compile_one(
            "SELECT Symbol, LastSale FROM './tickers.csv' \
             WHERE LastSale < 1.00 ORDER BY Symbol DESC LIMIT 5",
        );
        let Executable::Select(select) = statement else {
            panic!("expected select");
        };
        assert_eq!(select.fields.len(), 2);
        assert_eq!(select.source.path, "./tickers.csv");
        assert!(select.condition.is_some());
        assert!(select.group_by.is_none());
        let order_by = select.order_by.unwrap();
        assert_eq!(order_by[0].0.name, "Symbol");
        assert_eq!(order_by[0].1, SortOrder::Descending);
        assert_eq!(select.limit, Some(5));
    }

    #[test]
    fn test_keyword_case_is_insensitive_identifiers_are_not() {
        let lower = compile_one("select X from t");
        let upper = compile_one("SELECT X FROM t");
        assert_eq!(lower, upper);

        let lowercase_field = compile_one("SELECT x FROM t");
        assert_ne!(lower, lowercase_field);
    }

    #[test]
    fn test_insert_single_and_multi_row() {
        let statement = compile_one("INSERT INTO './out.csv' (Symbol, Price) VALUES ('AAPL', 150.25)");
        let Executable::Insert(insert) = statement else {
            panic!("expected insert");
        };
        assert_eq!(insert.target.path, "./out.csv");
        assert_eq!(insert.fields.len(), 2);
        assert_eq!(insert.source.rows.len(), 1);
        assert!(!insert.overwrite);

        let statement = compile_one("INSERT OVERWRITE INTO 'o.csv' (a) VALUES (1), (2), (3)");
        let Executable::Insert(insert) = statement else {
            panic!("expected insert");
        };
        assert!(insert.overwrite);
        assert_eq!(insert.source.rows.len(), 3);
    }

    #[test]
    fn test_create_view_wraps_statement() {
        let statement = compile_one("CREATE VIEW tech AS SELECT * FROM './t.csv'");
        let Executable::CreateView(view) = statement else {
            panic!("expected create view");
        };
        assert_eq!(view.name, "tech");
        assert!(matches!(*view.statement, Executable::Select(_)));
    }

    #[test]
    fn test_script_splits_on_semicolons() {
        let statements =
            compile_script("DESCRIBE './a.csv'; SELECT * FROM './a.csv';").unwrap();
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_call_statement() {
        assert!(matches!(compile_one("NOW()"), Executable::Call(_)));
    }

    #[test]
    fn test_unrecognized_statement() {
        assert!(matches!(
            compile_script("FROM x"),
            Err(Error::Syntax { .. })
        ));
    }

    #[test]
    fn test_group_by() {
        let statement = compile_one(
            "SELECT Sector, count(*) FROM './t.csv' GROUP BY Sector",
        );
        let Executable::Select(select) = statement else {
            panic!("expected select");
        };
        let group_by = select.group_by.unwrap();
        assert_eq!(group_by[0].name, "Sector");
        assert!(matches!(
            &select.fields[1],
            Expression::Function(name, _) if name == "count"
        ));
    }
}
