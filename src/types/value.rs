//! Dynamic runtime values
//!
//! Every payload flowing through the engine is one of these variants. There
//! is no static type system: sources produce whatever their cells parse as,
//! and operations coerce at evaluation time.

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A dynamically typed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Str(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this is one of the numeric variants.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Integer(_) | Value::Float(_) | Value::Decimal(_)
        )
    }

    /// Converts the value to a boolean, or errors for non-boolean variants.
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Null => Ok(false),
            other => Err(Error::Runtime(format!("expected boolean, found {}", other))),
        }
    }

    /// Converts any numeric variant to f64 for mixed-type comparison.
    fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// A short name for the variant, used by DESCRIBE and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Str(_) => "string",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Parses a raw text cell into the most specific value it can hold.
    /// Empty text becomes NULL; unparseable text stays a string.
    pub fn parse_text(text: &str) -> Value {
        if text.is_empty() {
            return Value::Null;
        }
        if let Ok(n) = text.parse::<i64>() {
            return Value::Integer(n);
        }
        if let Ok(n) = text.parse::<f64>() {
            return Value::Float(n);
        }
        match text.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Str(text.to_string()),
        }
    }

    /// Renders the value as a bare cell for delimited output. NULL renders
    /// as the empty string so a round-trip re-reads it as NULL.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Total ordering across all variants. NULL compares below every
    /// non-null value; numerics compare across representations; otherwise
    /// values of different kinds order by variant rank.
    pub fn compare(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                match (a.to_f64(), b.to_f64()) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    _ => Ordering::Equal,
                }
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) | Value::Float(_) | Value::Decimal(_) => 2,
            Value::Str(_) => 3,
            Value::Timestamp(_) => 4,
        }
    }

    /// a + b: adds two numbers or concatenates two strings.
    pub fn checked_add(&self, other: &Value) -> Result<Value> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => Ok(Null),
            (Integer(a), Integer(b)) => a
                .checked_add(*b)
                .map(Integer)
                .ok_or_else(|| Error::Runtime("integer overflow in addition".into())),
            (Str(a), Str(b)) => Ok(Str(format!("{}{}", a, b))),
            (a, b) => numeric_op(a, b, "add", |x, y| Some(x + y), |x, y| x.checked_add(y)),
        }
    }

    /// a - b: subtracts two numbers.
    pub fn checked_sub(&self, other: &Value) -> Result<Value> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => Ok(Null),
            (Integer(a), Integer(b)) => a
                .checked_sub(*b)
                .map(Integer)
                .ok_or_else(|| Error::Runtime("integer overflow in subtraction".into())),
            (a, b) => numeric_op(a, b, "subtract", |x, y| Some(x - y), |x, y| {
                x.checked_sub(y)
            }),
        }
    }

    /// a * b: multiplies two numbers.
    pub fn checked_mul(&self, other: &Value) -> Result<Value> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => Ok(Null),
            (Integer(a), Integer(b)) => a
                .checked_mul(*b)
                .map(Integer)
                .ok_or_else(|| Error::Runtime("integer overflow in multiplication".into())),
            (a, b) => numeric_op(a, b, "multiply", |x, y| Some(x * y), |x, y| {
                x.checked_mul(y)
            }),
        }
    }

    /// a / b: divides two numbers. Division by zero is an error.
    pub fn checked_div(&self, other: &Value) -> Result<Value> {
        use Value::*;
        if other.to_f64() == Some(0.0) {
            return Err(Error::Runtime("division by zero".into()));
        }
        match (self, other) {
            (Null, _) | (_, Null) => Ok(Null),
            (Integer(a), Integer(b)) => Ok(Integer(a / b)),
            (a, b) => numeric_op(a, b, "divide", |x, y| Some(x / y), |x, y| x.checked_div(y)),
        }
    }

    /// -a: negates a number.
    pub fn checked_neg(&self) -> Result<Value> {
        match self {
            Value::Null => Ok(Value::Null),
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| Error::Runtime("integer overflow in negation".into())),
            Value::Float(n) => Ok(Value::Float(-n)),
            Value::Decimal(d) => Ok(Value::Decimal(-d)),
            other => Err(Error::Runtime(format!("can't negate {}", other))),
        }
    }
}

/// Applies a numeric operation to two values, promoting to Decimal when
/// either side is a Decimal and to f64 otherwise.
fn numeric_op(
    a: &Value,
    b: &Value,
    name: &str,
    float_op: impl Fn(f64, f64) -> Option<f64>,
    decimal_op: impl Fn(Decimal, Decimal) -> Option<Decimal>,
) -> Result<Value> {
    if let (Value::Decimal(_), _) | (_, Value::Decimal(_)) = (a, b) {
        if let (Some(x), Some(y)) = (to_decimal(a), to_decimal(b)) {
            return decimal_op(x, y)
                .map(Value::Decimal)
                .ok_or_else(|| Error::Runtime(format!("decimal overflow in {}", name)));
        }
    }
    match (a.to_f64(), b.to_f64()) {
        (Some(x), Some(y)) => float_op(x, y)
            .map(Value::Float)
            .ok_or_else(|| Error::Runtime(format!("overflow in {}", name))),
        _ => Err(Error::Runtime(format!(
            "can't {} {} and {}",
            name, a, b
        ))),
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Some(Decimal::from(*n)),
        Value::Float(n) => Decimal::from_f64(*n),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        assert_eq!(Value::parse_text("42"), Value::Integer(42));
        assert_eq!(Value::parse_text("1.5"), Value::Float(1.5));
        assert_eq!(Value::parse_text("true"), Value::Bool(true));
        assert_eq!(Value::parse_text("AAPL"), Value::Str("AAPL".into()));
        assert_eq!(Value::parse_text(""), Value::Null);
    }

    #[test]
    fn test_null_sorts_below_everything() {
        for value in [
            Value::Bool(false),
            Value::Integer(i64::MIN),
            Value::Float(f64::NEG_INFINITY),
            Value::Str(String::new()),
        ] {
            assert_eq!(Value::Null.compare(&value), Ordering::Less);
            assert_eq!(value.compare(&Value::Null), Ordering::Greater);
        }
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn test_cross_numeric_compare() {
        assert_eq!(
            Value::Integer(1).compare(&Value::Float(1.5)),
            Ordering::Less
        );
        assert_eq!(
            Value::Float(2.0).compare(&Value::Integer(2)),
            Ordering::Equal
        );
        assert_eq!(
            Value::Decimal(Decimal::new(150, 1)).compare(&Value::Integer(15)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            Value::Integer(2).checked_add(&Value::Integer(3)).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            Value::Integer(2).checked_mul(&Value::Float(1.5)).unwrap(),
            Value::Float(3.0)
        );
        assert_eq!(
            Value::Str("ab".into())
                .checked_add(&Value::Str("cd".into()))
                .unwrap(),
            Value::Str("abcd".into())
        );
        assert_eq!(
            Value::Null.checked_add(&Value::Integer(1)).unwrap(),
            Value::Null
        );
        assert!(Value::Integer(1).checked_div(&Value::Integer(0)).is_err());
        assert!(Value::Integer(i64::MAX)
            .checked_add(&Value::Integer(1))
            .is_err());
    }

    #[test]
    fn test_to_text_round_trip() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::parse_text(&Value::Float(150.25).to_text()), Value::Float(150.25));
    }
}
