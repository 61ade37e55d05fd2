//! Condition trees
//!
//! A condition is a boolean-producing node evaluated against a scope.
//! Conjunction and disjunction short-circuit: the right-hand side is not
//! evaluated when the left-hand side decides the outcome.

use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::types::{Expression, Value};
use std::cmp::Ordering;
use std::fmt;

/// A binary comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl CompareOp {
    /// Maps an operator token to the comparison it denotes, if any.
    pub fn from_text(text: &str) -> Option<CompareOp> {
        Some(match text {
            "=" => CompareOp::Equal,
            "<>" | "!=" => CompareOp::NotEqual,
            "<" => CompareOp::LessThan,
            "<=" => CompareOp::LessThanOrEqual,
            ">" => CompareOp::GreaterThan,
            ">=" => CompareOp::GreaterThanOrEqual,
            _ => return None,
        })
    }

    fn test(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::LessThan => ordering == Ordering::Less,
            CompareOp::LessThanOrEqual => ordering != Ordering::Greater,
            CompareOp::GreaterThan => ordering == Ordering::Greater,
            CompareOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "<>",
            CompareOp::LessThan => "<",
            CompareOp::LessThanOrEqual => "<=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterThanOrEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// lhs op rhs, under the total value ordering (NULL below non-nulls).
    Compare {
        op: CompareOp,
        lhs: Expression,
        rhs: Expression,
    },
    /// expr [NOT] LIKE pattern, with % and _ wildcards.
    Like {
        expr: Expression,
        pattern: Expression,
        negated: bool,
    },
    /// expr [NOT] IN (v1, v2, ...).
    In {
        expr: Expression,
        list: Vec<Expression>,
        negated: bool,
    },
    /// expr BETWEEN low AND high, inclusive on both ends.
    Between {
        expr: Expression,
        low: Expression,
        high: Expression,
    },
    /// expr IS [NOT] NULL.
    IsNull { expr: Expression, negated: bool },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Evaluates the condition against the given scope.
    pub fn is_satisfied(&self, scope: &Scope) -> Result<bool> {
        use Condition::*;
        Ok(match self {
            Compare { op, lhs, rhs } => op.test(lhs.compare(rhs, scope)?),
            Like {
                expr,
                pattern,
                negated,
            } => {
                let matched = match (expr.evaluate(scope)?, pattern.evaluate(scope)?) {
                    (Value::Null, _) | (_, Value::Null) => false,
                    (Value::Str(text), Value::Str(pattern)) => {
                        like_pattern_to_regex(&pattern)?.is_match(&text)
                    }
                    (text, pattern) => {
                        return Err(Error::Runtime(format!(
                            "LIKE expects strings, found {} and {}",
                            text.kind(),
                            pattern.kind()
                        )));
                    }
                };
                matched != *negated
            }
            In {
                expr,
                list,
                negated,
            } => {
                let value = expr.evaluate(scope)?;
                let mut found = false;
                for candidate in list {
                    if value.compare(&candidate.evaluate(scope)?) == Ordering::Equal {
                        found = true;
                        break;
                    }
                }
                found != *negated
            }
            Between { expr, low, high } => {
                let value = expr.evaluate(scope)?;
                value.compare(&low.evaluate(scope)?) != Ordering::Less
                    && value.compare(&high.evaluate(scope)?) != Ordering::Greater
            }
            IsNull { expr, negated } => expr.evaluate(scope)?.is_null() != *negated,
            And(lhs, rhs) => lhs.is_satisfied(scope)? && rhs.is_satisfied(scope)?,
            Or(lhs, rhs) => lhs.is_satisfied(scope)? || rhs.is_satisfied(scope)?,
            Not(inner) => !inner.is_satisfied(scope)?,
        })
    }
}

/// Translates a SQL LIKE pattern to an anchored regex: % matches any run of
/// characters, _ matches exactly one, \ escapes the next character.
fn like_pattern_to_regex(pattern: &str) -> Result<regex::Regex> {
    let mut out = String::from("^");
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    Ok(regex::Regex::new(&out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    fn literal(value: Value) -> Expression {
        Expression::Literal(value)
    }

    #[test]
    fn test_compare() {
        let scope = Scope::root();
        let cond = Condition::Compare {
            op: CompareOp::LessThan,
            lhs: literal(Value::Float(0.5)),
            rhs: literal(Value::Integer(1)),
        };
        assert!(cond.is_satisfied(&scope).unwrap());
    }

    #[test]
    fn test_null_compares_below_non_null() {
        let scope = Scope::root();
        let cond = Condition::Compare {
            op: CompareOp::LessThan,
            lhs: literal(Value::Null),
            rhs: literal(Value::Integer(0)),
        };
        assert!(cond.is_satisfied(&scope).unwrap());
    }

    #[test]
    fn test_like() {
        let scope = Scope::root();
        let matches = |text: &str, pattern: &str| {
            Condition::Like {
                expr: literal(Value::Str(text.into())),
                pattern: literal(Value::Str(pattern.into())),
                negated: false,
            }
            .is_satisfied(&scope)
            .unwrap()
        };
        assert!(matches("hello world", "hello%"));
        assert!(matches("hello", "h_llo"));
        assert!(matches("100%", "100\\%"));
        assert!(!matches("hello", "goodbye%"));
        assert!(!matches("hello", "h.llo"));
    }

    #[test]
    fn test_in_and_between() {
        let scope = Scope::root();
        let cond = Condition::In {
            expr: literal(Value::Str("b".into())),
            list: vec![literal(Value::Str("a".into())), literal(Value::Str("b".into()))],
            negated: false,
        };
        assert!(cond.is_satisfied(&scope).unwrap());

        let cond = Condition::Between {
            expr: literal(Value::Integer(5)),
            low: literal(Value::Integer(1)),
            high: literal(Value::Integer(5)),
        };
        assert!(cond.is_satisfied(&scope).unwrap());
    }

    #[test]
    fn test_is_null() {
        let scope = Scope::root();
        let cond = Condition::IsNull {
            expr: literal(Value::Null),
            negated: false,
        };
        assert!(cond.is_satisfied(&scope).unwrap());
        let cond = Condition::IsNull {
            expr: literal(Value::Integer(1)),
            negated: true,
        };
        assert!(cond.is_satisfied(&scope).unwrap());
    }
}
