//! Template-driven statement extraction
//!
//! A statement grammar is declared once as a template string whose
//! space-separated tags are either SQL literals or typed placeholders:
//!
//! | Tag          | Meaning                                           |
//! |--------------|---------------------------------------------------|
//! | `@name`      | required identifier, recorded by name             |
//! | `@(name)`    | comma-separated field names                       |
//! | `@{name}`    | comma-separated expressions, each optionally aliased with AS |
//! | `@[name]`    | literal value list, terminated by `)`             |
//! | `@\|name\|`  | comma-separated sort fields with optional ASC/DESC |
//! | `@<name>`    | a condition                                       |
//! | `@/pattern/` | the next token must match the pattern             |
//! | `?KEYWORD`   | optional keyword; on a miss the dependent tail is skipped |
//! | `+?KEYWORD`  | mandatory follow-on keyword inside an optional group |
//! | literal      | the keyword itself, matched case-insensitively    |
//!
//! Extraction is a single forward pass over both the template tags and the
//! token stream: the stream never rewinds, and skipping an optional group
//! happens entirely on the template side.

use super::lexer::{TokenKind, TokenStream};
use super::{condition, expression};
use crate::error::{Error, Result};
use crate::types::{Condition, Expression, Field, SortOrder, Value};
use regex::Regex;
use std::collections::HashMap;

/// The extraction bag: one typed map per placeholder family, keyed by the
/// placeholder name.
#[derive(Default)]
pub struct Template {
    identifiers: HashMap<String, String>,
    field_references: HashMap<String, Vec<Field>>,
    field_arguments: HashMap<String, Vec<Expression>>,
    conditions: HashMap<String, Condition>,
    sort_fields: HashMap<String, Vec<(Field, SortOrder)>>,
    insert_values: HashMap<String, Vec<Value>>,
}

impl Template {
    pub fn identifier(&self, name: &str) -> Option<&str> {
        self.identifiers.get(name).map(String::as_str)
    }

    pub fn fields(&self, name: &str) -> Option<&[Field]> {
        self.field_references.get(name).map(Vec::as_slice)
    }

    pub fn arguments(&self, name: &str) -> Option<&[Expression]> {
        self.field_arguments.get(name).map(Vec::as_slice)
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(name)
    }

    pub fn sort_fields(&self, name: &str) -> Option<&[(Field, SortOrder)]> {
        self.sort_fields.get(name).map(Vec::as_slice)
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.insert_values.get(name).map(Vec::as_slice)
    }

    /// Merges another bag into this one. Keys must be disjoint per slot; a
    /// collision is a programming error in the templates and fails fast.
    pub fn merge(&mut self, other: Template) -> Result<()> {
        merge_slot(&mut self.identifiers, other.identifiers)?;
        merge_slot(&mut self.field_references, other.field_references)?;
        merge_slot(&mut self.field_arguments, other.field_arguments)?;
        merge_slot(&mut self.conditions, other.conditions)?;
        merge_slot(&mut self.sort_fields, other.sort_fields)?;
        merge_slot(&mut self.insert_values, other.insert_values)?;
        Ok(())
    }
}

fn merge_slot<V>(target: &mut HashMap<String, V>, source: HashMap<String, V>) -> Result<()> {
    for (key, value) in source {
        if target.contains_key(&key) {
            return Err(Error::Internal(format!(
                "duplicate template key: {}",
                key
            )));
        }
        target.insert(key, value);
    }
    Ok(())
}

/// Runs the template against the token stream and returns the filled bag.
pub fn extract(ts: &mut TokenStream, template: &str) -> Result<Template> {
    let tags: Vec<&str> = template.split(' ').filter(|t| !t.is_empty()).collect();
    let mut bag = Template::default();

    let mut i = 0;
    while i < tags.len() {
        let tag = tags[i];
        if let Some(name) = enclosed(tag, "@(", ")") {
            insert(&mut bag.field_references, name, extract_fields(ts)?)?;
        } else if let Some(name) = enclosed(tag, "@{", "}") {
            insert(&mut bag.field_arguments, name, extract_expressions(ts)?)?;
        } else if let Some(name) = enclosed(tag, "@[", "]") {
            insert(&mut bag.insert_values, name, extract_values(ts)?)?;
        } else if let Some(name) = enclosed(tag, "@|", "|") {
            insert(&mut bag.sort_fields, name, extract_sort_fields(ts)?)?;
        } else if let Some(name) = enclosed(tag, "@<", ">") {
            insert(&mut bag.conditions, name, condition::parse_condition(ts)?)?;
        } else if let Some(pattern) = enclosed(tag, "@/", "/") {
            let pattern = Regex::new(pattern)?;
            if !ts.matches(&pattern) {
                return Err(ts.error_here(format!("expected token matching {}", pattern)));
            }
        } else if let Some(keyword) = tag.strip_prefix("+?") {
            ts.expect(keyword)?;
        } else if let Some(keyword) = tag.strip_prefix('?') {
            if ts.next_if(keyword) {
                // Matched optional keywords are recorded so compilers can
                // observe their presence.
                insert(&mut bag.identifiers, keyword, keyword.to_string())?;
            } else {
                // Skip the dependent tail: every following tag that is a
                // placeholder or a mandatory follow-on keyword.
                while i + 1 < tags.len()
                    && (tags[i + 1].starts_with('@') || tags[i + 1].starts_with("+?"))
                {
                    i += 1;
                }
            }
        } else if let Some(name) = tag.strip_prefix('@') {
            let token = extract_identifier(ts)?;
            insert(&mut bag.identifiers, name, token)?;
        } else {
            ts.expect(tag)?;
        }
        i += 1;
    }
    Ok(bag)
}

fn insert<V>(slot: &mut HashMap<String, V>, name: &str, value: V) -> Result<()> {
    if slot.contains_key(name) {
        return Err(Error::Internal(format!("duplicate template key: {}", name)));
    }
    slot.insert(name.to_string(), value);
    Ok(())
}

fn enclosed<'a>(tag: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    tag.strip_prefix(prefix)?.strip_suffix(suffix)
}

/// One identifier-valued token: a bare identifier, a quoted path, or a
/// number (for LIMIT-style slots). The recorded value is the token's text.
fn extract_identifier(ts: &mut TokenStream) -> Result<String> {
    match ts.peek().map(|t| t.kind) {
        Some(TokenKind::Identifier) | Some(TokenKind::Str) | Some(TokenKind::Number) => {
            Ok(ts.next()?.text)
        }
        _ => Err(ts.error_here("expected identifier")),
    }
}

/// `Field (',' Field)*`
fn extract_fields(ts: &mut TokenStream) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    loop {
        match ts.peek().map(|t| t.kind) {
            Some(TokenKind::Identifier) => fields.push(Field::new(ts.next()?.text)),
            _ => return Err(ts.error_here("expected field name")),
        }
        if !ts.next_if(",") {
            return Ok(fields);
        }
    }
}

/// `expr [AS alias] (',' expr [AS alias])*`
fn extract_expressions(ts: &mut TokenStream) -> Result<Vec<Expression>> {
    let mut expressions = Vec::new();
    loop {
        let expr = expression::parse_expression(ts)?;
        let expr = if ts.next_if("AS") {
            match ts.peek().map(|t| t.kind) {
                Some(TokenKind::Identifier) => {
                    Expression::Alias(Box::new(expr), ts.next()?.text)
                }
                _ => return Err(ts.error_here("expected alias")),
            }
        } else {
            expr
        };
        expressions.push(expr);
        if !ts.next_if(",") {
            return Ok(expressions);
        }
    }
}

/// Literal values up to (but not consuming) the closing parenthesis. An
/// optional leading minus negates a numeric literal.
pub(crate) fn extract_values(ts: &mut TokenStream) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    loop {
        let negated = ts.next_if("-");
        let token = match ts.peek().map(|t| t.kind) {
            Some(TokenKind::Number) | Some(TokenKind::Str) => ts.next()?,
            Some(TokenKind::Keyword)
                if ts.is("TRUE") || ts.is("FALSE") || ts.is("NULL") =>
            {
                ts.next()?
            }
            _ => return Err(ts.error_here("expected literal value")),
        };
        let mut value = token.value();
        if negated {
            value = value.checked_neg().map_err(|_| Error::Syntax {
                message: "expected numeric literal after -".into(),
                token: Some(token.text.clone()),
                line: token.line,
                column: token.column,
            })?;
        }
        values.push(value);
        if !ts.next_if(",") {
            return Ok(values);
        }
    }
}

/// `Field [ASC|DESC] (',' Field [ASC|DESC])*`, defaulting to ascending.
fn extract_sort_fields(ts: &mut TokenStream) -> Result<Vec<(Field, SortOrder)>> {
    let mut fields = Vec::new();
    loop {
        let field = match ts.peek().map(|t| t.kind) {
            Some(TokenKind::Identifier) => Field::new(ts.next()?.text),
            _ => return Err(ts.error_here("expected sort field")),
        };
        let order = if ts.next_if("DESC") {
            SortOrder::Descending
        } else {
            ts.next_if("ASC");
            SortOrder::Ascending
        };
        fields.push((field, order));
        if !ts.next_if(",") {
            return Ok(fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(input: &str) -> TokenStream {
        TokenStream::tokenize(input).unwrap()
    }

    #[test]
    fn test_identifier_and_literal_tags() {
        let mut ts = stream("INSERT INTO './out.csv'");
        let bag = extract(&mut ts, "INSERT INTO @target").unwrap();
        assert_eq!(bag.identifier("target"), Some("./out.csv"));
    }

    #[test]
    fn test_field_list() {
        let mut ts = stream("( Symbol , Price )");
        let bag = extract(&mut ts, "( @(fields) )").unwrap();
        let fields = bag.fields("fields").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Symbol");
        assert_eq!(fields[1].name, "Price");
    }

    #[test]
    fn test_value_list_stops_at_close_paren() {
        let mut ts = stream("( 'AAPL', -1.5, TRUE, NULL )");
        let bag = extract(&mut ts, "( @[values] )").unwrap();
        assert_eq!(
            bag.values("values").unwrap(),
            &[
                Value::Str("AAPL".into()),
                Value::Float(-1.5),
                Value::Bool(true),
                Value::Null
            ]
        );
        assert!(!ts.has_next());
    }

    #[test]
    fn test_optional_group_taken() {
        let mut ts = stream("WHERE x > 1 ORDER BY x DESC");
        let bag = extract(&mut ts, "?WHERE @<cond> ?ORDER +?BY @|sort|").unwrap();
        assert!(bag.condition("cond").is_some());
        assert_eq!(
            bag.sort_fields("sort").unwrap(),
            &[(Field::new("x"), SortOrder::Descending)]
        );
        // Presence of the optional keywords is observable.
        assert_eq!(bag.identifier("WHERE"), Some("WHERE"));
        assert_eq!(bag.identifier("ORDER"), Some("ORDER"));
    }

    #[test]
    fn test_optional_group_skipped() {
        let mut ts = stream("LIMIT 5");
        let bag = extract(&mut ts, "?WHERE @<cond> ?ORDER +?BY @|sort| ?LIMIT @limit").unwrap();
        assert!(bag.condition("cond").is_none());
        assert!(bag.sort_fields("sort").is_none());
        assert_eq!(bag.identifier("limit"), Some("5"));
    }

    #[test]
    fn test_regex_gate() {
        let mut ts = stream("42");
        assert!(extract(&mut ts, "@/^[0-9]+$/ @limit").is_ok());

        let mut ts = stream("oops");
        assert!(extract(&mut ts, "@/^[0-9]+$/ @limit").is_err());
    }

    #[test]
    fn test_determinism_and_order() {
        for _ in 0..3 {
            let mut ts = stream("a, b, c");
            let bag = extract(&mut ts, "@(fields)").unwrap();
            let names: Vec<&str> = bag
                .fields("fields")
                .unwrap()
                .iter()
                .map(|f| f.name.as_str())
                .collect();
            assert_eq!(names, ["a", "b", "c"]);
        }
    }

    #[test]
    fn test_merge_disjoint_and_collision() {
        let mut ts = stream("INTO x");
        let mut first = extract(&mut ts, "INTO @target").unwrap();

        let mut ts = stream("FROM y");
        let second = extract(&mut ts, "FROM @source").unwrap();
        first.merge(second).unwrap();
        assert_eq!(first.identifier("target"), Some("x"));
        assert_eq!(first.identifier("source"), Some("y"));

        let mut ts = stream("INTO z");
        let clash = extract(&mut ts, "INTO @target").unwrap();
        assert!(matches!(first.merge(clash), Err(Error::Internal(_))));
    }

    #[test]
    fn test_keyword_mismatch_fails() {
        let mut ts = stream("SELECT x");
        assert!(matches!(
            extract(&mut ts, "INSERT"),
            Err(Error::Syntax { .. })
        ));
    }
}
