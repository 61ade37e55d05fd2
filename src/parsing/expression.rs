//! Expression parser
//!
//! Precedence-climbing producer of [`Expression`] trees. This layer knows
//! only arithmetic: boolean operators belong to the conditional parser,
//! which calls back into this one for its operands. Comma-separated lists
//! are split by callers; a single call parses a single expression.

use super::lexer::{TokenKind, TokenStream};
use crate::error::{Error, Result};
use crate::types::{Expression, Value};

/// Operator precedence.
type Precedence = u8;

/// Prefix operators. Right-associative by definition.
enum PrefixOperator {
    Minus, // -a
    Plus,  // +a
}

impl PrefixOperator {
    fn precedence(&self) -> Precedence {
        3
    }

    fn into_expression(self, rhs: Expression) -> Expression {
        let rhs = Box::new(rhs);
        match self {
            Self::Minus => Expression::Negate(rhs),
            Self::Plus => Expression::Identity(rhs),
        }
    }
}

/// Infix operators. All left-associative.
enum InfixOperator {
    Add,      // a + b
    Subtract, // a - b
    Multiply, // a * b
    Divide,   // a / b
}

impl InfixOperator {
    fn precedence(&self) -> Precedence {
        match self {
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide => 2,
        }
    }

    fn into_expression(self, lhs: Expression, rhs: Expression) -> Expression {
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
        match self {
            Self::Add => Expression::Add(lhs, rhs),
            Self::Subtract => Expression::Subtract(lhs, rhs),
            Self::Multiply => Expression::Multiply(lhs, rhs),
            Self::Divide => Expression::Divide(lhs, rhs),
        }
    }
}

/// Parses a single expression.
pub fn parse_expression(ts: &mut TokenStream) -> Result<Expression> {
    parse_expression_at(ts, 0)
}

/// Continues parsing infix operators onto an already-parsed left-hand
/// side. The conditional parser uses this after resolving a parenthesized
/// group to an expression.
pub(crate) fn continue_expression(
    ts: &mut TokenStream,
    lhs: Expression,
    min_precedence: Precedence,
) -> Result<Expression> {
    let mut lhs = lhs;
    while let Some(infix) = parse_infix_operator(ts, min_precedence) {
        // Left-associative: the right-hand side binds above this operator.
        let rhs = parse_expression_at(ts, infix.precedence() + 1)?;
        lhs = infix.into_expression(lhs, rhs);
    }
    Ok(lhs)
}

/// Parses an expression at the given minimum precedence.
fn parse_expression_at(ts: &mut TokenStream, min_precedence: Precedence) -> Result<Expression> {
    let lhs = if let Some(prefix) = parse_prefix_operator(ts, min_precedence) {
        let rhs = parse_expression_at(ts, prefix.precedence())?;
        prefix.into_expression(rhs)
    } else {
        parse_atom(ts)?
    };
    continue_expression(ts, lhs, min_precedence)
}

/// Parses an expression atom: a literal, a field or function reference,
/// `*`, a parenthesized expression, or a scalar subquery.
fn parse_atom(ts: &mut TokenStream) -> Result<Expression> {
    if !ts.has_next() {
        return Err(ts.error_here("expression expected"));
    }
    let token = ts.next()?;
    Ok(match token.kind {
        TokenKind::Number => Expression::Literal(token.value()),
        TokenKind::Str => Expression::Literal(Value::Str(token.text)),
        TokenKind::Keyword
            if token.is("TRUE") || token.is("FALSE") || token.is("NULL") =>
        {
            Expression::Literal(token.value())
        }
        TokenKind::Operator if token.text == "*" => Expression::All,
        TokenKind::Punctuation if token.text == "(" => {
            if ts.is("SELECT") {
                let statement = super::compiler::compile_statement(ts)?;
                ts.expect(")")?;
                Expression::Subquery(Box::new(statement))
            } else {
                let expr = parse_expression(ts)?;
                ts.expect(")")?;
                expr
            }
        }
        TokenKind::Identifier => {
            if ts.next_if("(") {
                // A function call: identifier followed immediately by (.
                let mut args = Vec::new();
                while !ts.next_if(")") {
                    if !args.is_empty() {
                        ts.expect(",")?;
                    }
                    args.push(parse_expression(ts)?);
                }
                Expression::Function(token.text, args)
            } else {
                Expression::Field(token.text)
            }
        }
        _ => {
            return Err(Error::Syntax {
                message: "expression expected".into(),
                token: Some(token.text),
                line: token.line,
                column: token.column,
            });
        }
    })
}

fn parse_prefix_operator(ts: &mut TokenStream, min_precedence: Precedence) -> Option<PrefixOperator> {
    let operator = match ts.peek()?.text.as_str() {
        "-" => PrefixOperator::Minus,
        "+" => PrefixOperator::Plus,
        _ => return None,
    };
    if operator.precedence() < min_precedence {
        return None;
    }
    ts.next().ok()?;
    Some(operator)
}

fn parse_infix_operator(ts: &mut TokenStream, min_precedence: Precedence) -> Option<InfixOperator> {
    let token = ts.peek()?;
    if token.kind != TokenKind::Operator {
        return None;
    }
    let operator = match token.text.as_str() {
        "+" => InfixOperator::Add,
        "-" => InfixOperator::Subtract,
        "*" => InfixOperator::Multiply,
        "/" => InfixOperator::Divide,
        _ => return None,
    };
    if operator.precedence() < min_precedence {
        return None;
    }
    ts.next().ok()?;
    Some(operator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    fn parse(input: &str) -> Expression {
        let mut ts = TokenStream::tokenize(input).unwrap();
        parse_expression(&mut ts).unwrap()
    }

    fn eval(input: &str) -> Value {
        parse(input).evaluate(&Scope::root()).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4"), Value::Integer(14));
        assert_eq!(eval("(2 + 3) * 4"), Value::Integer(20));
        assert_eq!(eval("2 - 3 - 4"), Value::Integer(-5));
        assert_eq!(eval("-2 * 3"), Value::Integer(-6));
        assert_eq!(eval("-(2 + 3)"), Value::Integer(-5));
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("'text'"), Value::Str("text".into()));
        assert_eq!(eval("TRUE"), Value::Bool(true));
        assert_eq!(eval("null"), Value::Null);
        assert_eq!(eval("1.5e2"), Value::Float(150.0));
    }

    #[test]
    fn test_function_call_and_field() {
        assert_eq!(
            parse("upper(name)"),
            Expression::Function("upper".into(), vec![Expression::Field("name".into())])
        );
        assert_eq!(parse("name"), Expression::Field("name".into()));
    }

    #[test]
    fn test_count_star() {
        assert_eq!(
            parse("count(*)"),
            Expression::Function("count".into(), vec![Expression::All])
        );
    }

    #[test]
    fn test_empty_expression_fails() {
        let mut ts = TokenStream::tokenize("").unwrap();
        assert!(matches!(
            parse_expression(&mut ts),
            Err(Error::Syntax { message, .. }) if message.contains("expression expected")
        ));
    }

    #[test]
    fn test_malformed_suffix_fails() {
        let mut ts = TokenStream::tokenize("1 +").unwrap();
        assert!(parse_expression(&mut ts).is_err());
    }
}
