//! In-memory sources

use super::InputSource;
use crate::error::{Error, Result};
use crate::execution::{ResultSet, Row};
use crate::scope::Scope;
use crate::types::{Field, Value};

/// The rows of an INSERT ... VALUES clause, presented as an input source:
/// each tuple pairs with the field list by position.
#[derive(Clone, Debug, PartialEq)]
pub struct LiteralSource {
    pub fields: Vec<Field>,
    pub rows: Vec<Vec<Value>>,
}

impl LiteralSource {
    pub fn new(fields: Vec<Field>, rows: Vec<Vec<Value>>) -> Self {
        LiteralSource { fields, rows }
    }
}

impl InputSource for LiteralSource {
    fn execute(&self, _scope: &Scope) -> Result<ResultSet> {
        let mut out = Vec::with_capacity(self.rows.len());
        for values in &self.rows {
            if values.len() != self.fields.len() {
                return Err(Error::Runtime(format!(
                    "expected {} values, found {}",
                    self.fields.len(),
                    values.len()
                )));
            }
            let cells = self
                .fields
                .iter()
                .zip(values)
                .map(|(field, value)| (field.name.clone(), value.clone()))
                .collect();
            out.push(Row::new(cells));
        }
        Ok(ResultSet::from_rows(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    #[test]
    fn test_pairs_fields_positionally() {
        let source = LiteralSource::new(
            vec![Field::new("a"), Field::new("b")],
            vec![vec![Value::Integer(1), Value::Str("x".into())]],
        );
        let rows = source.execute(&Scope::root()).unwrap().collect_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&Value::Integer(1)));
        assert_eq!(rows[0].get("b"), Some(&Value::Str("x".into())));
    }

    #[test]
    fn test_arity_mismatch() {
        let source = LiteralSource::new(vec![Field::new("a")], vec![vec![]]);
        assert!(source.execute(&Scope::root()).is_err());
    }
}
