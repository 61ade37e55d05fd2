//! Expression trees
//!
//! An expression is an immutable tree of nested operations and values,
//! reduced to a single [`Value`] against a [`Scope`] during execution.
//! Evaluation is pure given a scope; NULL propagates through arithmetic.

use crate::error::{Error, Result};
use crate::execution::Executable;
use crate::scope::{MissingFunctions, Scope};
use crate::types::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// A constant value.
    Literal(Value),
    /// A field reference, looked up in the row bound to the scope.
    Field(String),
    /// All columns; valid in projections and as the count(*) argument.
    All,
    /// An unresolved call by name, resolved in scope at evaluation time.
    Function(String, Vec<Expression>),
    /// a + b: adds two numbers or concatenates strings.
    Add(Box<Expression>, Box<Expression>),
    /// a - b: subtracts two numbers.
    Subtract(Box<Expression>, Box<Expression>),
    /// a * b: multiplies two numbers.
    Multiply(Box<Expression>, Box<Expression>),
    /// a / b: divides two numbers.
    Divide(Box<Expression>, Box<Expression>),
    /// -a: negates a number.
    Negate(Box<Expression>),
    /// +a: the identity function.
    Identity(Box<Expression>),
    /// expr AS name: names the projected column; evaluates as the inner
    /// expression.
    Alias(Box<Expression>, String),
    /// A scalar subquery: first column of the first result row.
    Subquery(Box<Executable>),
}

impl Expression {
    /// Reduces the expression to a value against the given scope.
    pub fn evaluate(&self, scope: &Scope) -> Result<Value> {
        use Expression::*;
        Ok(match self {
            Literal(value) => value.clone(),
            Field(name) => scope
                .lookup_field(name)
                .ok_or_else(|| Error::Resolution(format!("unresolved field: {}", name)))?,
            All => {
                return Err(Error::Runtime(
                    "* is only valid as a projection or as the count(*) argument".into(),
                ));
            }
            Function(name, args) => match scope.lookup_function(name) {
                Some(function) => {
                    let signature = function.signature();
                    if args.len() < signature.min_args
                        || signature.max_args.is_some_and(|max| args.len() > max)
                    {
                        return Err(Error::Runtime(format!(
                            "wrong number of arguments for {}: got {}",
                            signature.name,
                            args.len()
                        )));
                    }
                    let args = args
                        .iter()
                        .map(|arg| arg.evaluate(scope))
                        .collect::<Result<Vec<_>>>()?;
                    function.execute(&args)?
                }
                None => match scope.options().missing_function {
                    MissingFunctions::Null => Value::Null,
                    MissingFunctions::Error => {
                        return Err(Error::Resolution(format!("unknown function: {}", name)));
                    }
                },
            },
            Add(lhs, rhs) => lhs.evaluate(scope)?.checked_add(&rhs.evaluate(scope)?)?,
            Subtract(lhs, rhs) => lhs.evaluate(scope)?.checked_sub(&rhs.evaluate(scope)?)?,
            Multiply(lhs, rhs) => lhs.evaluate(scope)?.checked_mul(&rhs.evaluate(scope)?)?,
            Divide(lhs, rhs) => lhs.evaluate(scope)?.checked_div(&rhs.evaluate(scope)?)?,
            Negate(expr) => expr.evaluate(scope)?.checked_neg()?,
            Identity(expr) => expr.evaluate(scope)?,
            Alias(expr, _) => expr.evaluate(scope)?,
            Subquery(executable) => {
                let mut child = scope.child();
                let mut result = executable.execute(&mut child)?;
                match result.next().transpose()? {
                    Some(row) => row.into_values().next().unwrap_or(Value::Null),
                    None => Value::Null,
                }
            }
        })
    }

    /// Evaluates both expressions and compares the results under the total
    /// value ordering (NULL below all non-nulls).
    pub fn compare(&self, other: &Expression, scope: &Scope) -> Result<Ordering> {
        Ok(self.evaluate(scope)?.compare(&other.evaluate(scope)?))
    }

    /// The column name this expression projects as.
    pub fn label(&self) -> String {
        use Expression::*;
        match self {
            Literal(value) => value.to_string(),
            Field(name) => name.clone(),
            All => "*".into(),
            Function(name, args) => {
                let args: Vec<String> = args.iter().map(|a| a.label()).collect();
                format!("{}({})", name, args.join(", "))
            }
            Add(lhs, rhs) => format!("{} + {}", lhs.label(), rhs.label()),
            Subtract(lhs, rhs) => format!("{} - {}", lhs.label(), rhs.label()),
            Multiply(lhs, rhs) => format!("{} * {}", lhs.label(), rhs.label()),
            Divide(lhs, rhs) => format!("{} / {}", lhs.label(), rhs.label()),
            Negate(expr) => format!("-{}", expr.label()),
            Identity(expr) => expr.label(),
            Alias(_, name) => name.clone(),
            Subquery(_) => "(subquery)".into(),
        }
    }

    /// Whether this projection is an aggregate call (possibly aliased),
    /// judged by the function resolvable in scope.
    pub fn is_aggregate(&self, scope: &Scope) -> bool {
        match self {
            Expression::Function(name, _) => scope
                .lookup_function(name)
                .is_some_and(|f| f.signature().is_aggregate),
            Expression::Alias(inner, _) => inner.is_aggregate(scope),
            _ => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    #[test]
    fn test_arithmetic_evaluation() {
        let scope = Scope::root();
        let expr = Expression::Add(
            Box::new(Expression::Literal(Value::Integer(2))),
            Box::new(Expression::Multiply(
                Box::new(Expression::Literal(Value::Integer(3))),
                Box::new(Expression::Literal(Value::Integer(4))),
            )),
        );
        assert_eq!(expr.evaluate(&scope).unwrap(), Value::Integer(14));
    }

    #[test]
    fn test_unresolved_field() {
        let scope = Scope::root();
        let err = Expression::Field("missing".into())
            .evaluate(&scope)
            .unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
    }

    #[test]
    fn test_missing_function_defaults_to_null() {
        let scope = Scope::root();
        let expr = Expression::Function("no_such_fn".into(), vec![]);
        assert_eq!(expr.evaluate(&scope).unwrap(), Value::Null);
    }

    #[test]
    fn test_alias_is_transparent() {
        let scope = Scope::root();
        let expr = Expression::Alias(
            Box::new(Expression::Literal(Value::Integer(7))),
            "seven".into(),
        );
        assert_eq!(expr.evaluate(&scope).unwrap(), Value::Integer(7));
        assert_eq!(expr.label(), "seven");
    }
}
