//! Conditional expression parser
//!
//! Layered on the expression parser: OR binds loosest, then AND, then NOT,
//! then comparisons, with parenthesization above all. Both layers share
//! the single token stream cursor with no lookahead beyond one token, so
//! a parenthesized group is resolved by parsing its first operand as an
//! expression and deciding from the next token whether the group is a
//! condition or an arithmetic grouping.

use super::expression;
use super::lexer::TokenStream;
use crate::error::Result;
use crate::types::{CompareOp, Condition, Expression};

/// Parses a condition. AND/OR are left-associative, NOT right-associative.
pub fn parse_condition(ts: &mut TokenStream) -> Result<Condition> {
    let mut lhs = parse_and_chain(ts)?;
    while ts.next_if("OR") {
        let rhs = parse_and_chain(ts)?;
        lhs = Condition::Or(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn parse_and_chain(ts: &mut TokenStream) -> Result<Condition> {
    let mut lhs = parse_unary(ts)?;
    while ts.next_if("AND") {
        let rhs = parse_unary(ts)?;
        lhs = Condition::And(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn parse_unary(ts: &mut TokenStream) -> Result<Condition> {
    if ts.next_if("NOT") {
        Ok(Condition::Not(Box::new(parse_unary(ts)?)))
    } else {
        parse_primary(ts)
    }
}

fn parse_primary(ts: &mut TokenStream) -> Result<Condition> {
    match parse_operand(ts)? {
        Operand::Condition(condition) => Ok(condition),
        Operand::Expression(expr) => parse_comparison_suffix(ts, expr),
    }
}

/// What a parenthesized group (or a bare operand) turned out to be.
enum Operand {
    Condition(Condition),
    Expression(Expression),
}

fn parse_operand(ts: &mut TokenStream) -> Result<Operand> {
    if !ts.is("(") {
        return Ok(Operand::Expression(expression::parse_expression(ts)?));
    }
    ts.next()?;

    if ts.is("SELECT") {
        let statement = super::compiler::compile_statement(ts)?;
        ts.expect(")")?;
        let expr = Expression::Subquery(Box::new(statement));
        return Ok(Operand::Expression(expression::continue_expression(
            ts, expr, 0,
        )?));
    }

    let inner = if ts.is("NOT") {
        Operand::Condition(parse_unary(ts)?)
    } else {
        parse_operand(ts)?
    };

    match inner {
        Operand::Condition(condition) => {
            let condition = continue_condition(ts, condition)?;
            ts.expect(")")?;
            Ok(Operand::Condition(condition))
        }
        Operand::Expression(expr) => {
            if comparison_follows(ts) {
                // The parentheses enclose a condition.
                let condition = parse_comparison_suffix(ts, expr)?;
                let condition = continue_condition(ts, condition)?;
                ts.expect(")")?;
                Ok(Operand::Condition(condition))
            } else {
                // The parentheses were arithmetic grouping.
                ts.expect(")")?;
                Ok(Operand::Expression(expression::continue_expression(
                    ts, expr, 0,
                )?))
            }
        }
    }
}

/// Continues an AND/OR chain from an already-parsed left-hand side, used
/// inside parenthesized groups.
fn continue_condition(ts: &mut TokenStream, mut lhs: Condition) -> Result<Condition> {
    loop {
        if ts.next_if("AND") {
            let rhs = parse_unary(ts)?;
            lhs = Condition::And(Box::new(lhs), Box::new(rhs));
        } else if ts.next_if("OR") {
            let rhs = parse_and_chain(ts)?;
            lhs = Condition::Or(Box::new(lhs), Box::new(rhs));
        } else {
            return Ok(lhs);
        }
    }
}

fn comparison_follows(ts: &TokenStream) -> bool {
    match ts.peek() {
        Some(token) => {
            CompareOp::from_text(&token.text).is_some()
                || token.is("IS")
                || token.is("IN")
                || token.is("LIKE")
                || token.is("BETWEEN")
                || token.is("NOT")
        }
        None => false,
    }
}

/// Parses the comparison following an already-parsed left-hand expression.
fn parse_comparison_suffix(ts: &mut TokenStream, lhs: Expression) -> Result<Condition> {
    if let Some(op) = ts.peek().and_then(|t| CompareOp::from_text(&t.text)) {
        ts.next()?;
        let rhs = expression::parse_expression(ts)?;
        return Ok(Condition::Compare { op, lhs, rhs });
    }

    if ts.next_if("IS") {
        let negated = ts.next_if("NOT");
        ts.expect("NULL")?;
        return Ok(Condition::IsNull { expr: lhs, negated });
    }

    if ts.next_if("NOT") {
        if ts.next_if("IN") {
            return parse_in_list(ts, lhs, true);
        }
        if ts.next_if("LIKE") {
            let pattern = expression::parse_expression(ts)?;
            return Ok(Condition::Like {
                expr: lhs,
                pattern,
                negated: true,
            });
        }
        if ts.next_if("BETWEEN") {
            return Ok(Condition::Not(Box::new(parse_between(ts, lhs)?)));
        }
        return Err(ts.error_here("expected IN, LIKE or BETWEEN after NOT"));
    }

    if ts.next_if("IN") {
        return parse_in_list(ts, lhs, false);
    }
    if ts.next_if("LIKE") {
        let pattern = expression::parse_expression(ts)?;
        return Ok(Condition::Like {
            expr: lhs,
            pattern,
            negated: false,
        });
    }
    if ts.next_if("BETWEEN") {
        return parse_between(ts, lhs);
    }

    Err(ts.error_here("expected comparison operator"))
}

fn parse_in_list(ts: &mut TokenStream, expr: Expression, negated: bool) -> Result<Condition> {
    ts.expect("(")?;
    let mut list = Vec::new();
    while !ts.next_if(")") {
        if !list.is_empty() {
            ts.expect(",")?;
        }
        list.push(expression::parse_expression(ts)?);
    }
    Ok(Condition::In {
        expr,
        list,
        negated,
    })
}

fn parse_between(ts: &mut TokenStream, expr: Expression) -> Result<Condition> {
    // The expression layer doesn't know AND, so the low bound stops there.
    let low = expression::parse_expression(ts)?;
    ts.expect("AND")?;
    let high = expression::parse_expression(ts)?;
    Ok(Condition::Between { expr, low, high })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    fn parse(input: &str) -> Condition {
        let mut ts = TokenStream::tokenize(input).unwrap();
        parse_condition(&mut ts).unwrap()
    }

    fn holds(input: &str) -> bool {
        parse(input).is_satisfied(&Scope::root()).unwrap()
    }

    #[test]
    fn test_comparisons() {
        assert!(holds("1 < 2"));
        assert!(holds("2 >= 2"));
        assert!(holds("'a' <> 'b'"));
        assert!(!holds("1 != 1"));
    }

    #[test]
    fn test_precedence_and_over_or() {
        // a OR b AND c parses as a OR (b AND c)
        assert!(holds("1 = 1 OR 1 = 2 AND 2 = 3"));
        assert!(!holds("(1 = 1 OR 1 = 2) AND 2 = 3"));
    }

    #[test]
    fn test_not_is_right_associative() {
        assert!(holds("NOT NOT 1 = 1"));
        assert!(holds("NOT 1 = 2"));
    }

    #[test]
    fn test_parenthesized_arithmetic_operand() {
        assert!(holds("(1 + 2) * 2 > 5"));
        assert!(holds("((1 + 2)) = 3"));
    }

    #[test]
    fn test_parenthesized_condition() {
        assert!(holds("(1 = 1 AND 2 = 2) OR 3 = 4"));
        assert!(holds("(NOT 1 = 2)"));
    }

    #[test]
    fn test_in_like_between_null() {
        assert!(holds("'b' IN ('a', 'b', 'c')"));
        assert!(holds("'d' NOT IN ('a', 'b')"));
        assert!(holds("'hello' LIKE 'h%'"));
        assert!(holds("'hello' NOT LIKE 'x%'"));
        assert!(holds("3 BETWEEN 1 AND 5 AND 1 = 1"));
        assert!(holds("6 NOT BETWEEN 1 AND 5"));
        assert!(holds("NULL IS NULL"));
        assert!(holds("1 IS NOT NULL"));
    }
}
