//! DESCRIBE execution

use super::{resolve_input, ResultSet, Row};
use crate::error::Result;
use crate::scope::Scope;
use crate::sources::DataResource;
use crate::types::Value;

/// Reports the columns of a source: one row per column of the source's
/// first row, with the inferred value kind and a sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Describe {
    pub source: DataResource,
}

impl Describe {
    pub(crate) fn execute(&self, scope: &mut Scope) -> Result<ResultSet> {
        let mut input = resolve_input(scope, &self.source)?;
        let rows = match input.next().transpose()? {
            Some(first) => first
                .into_iter()
                .map(|(name, value)| {
                    Row::new(vec![
                        ("column".into(), Value::Str(name)),
                        ("type".into(), Value::Str(value.kind().into())),
                        ("sample".into(), value),
                    ])
                })
                .collect(),
            None => Vec::new(),
        };
        Ok(ResultSet::from_rows(rows))
    }
}
