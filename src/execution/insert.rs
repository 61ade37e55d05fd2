//! INSERT statement execution
//!
//! Opens the resolved output sink, writes one projected row per source
//! row, and reports the write count with the sink's statistics. The sink
//! is closed on every exit path, including failure.

use super::{ResultSet, Row};
use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::sources::{DataResource, DataSourceFactory, InputSource, LiteralSource, OutputSource};
use crate::types::Field;

#[derive(Clone, Debug, PartialEq)]
pub struct Insert {
    pub target: DataResource,
    pub fields: Vec<Field>,
    pub source: LiteralSource,
    /// Truncate the target instead of appending to it.
    pub overwrite: bool,
}

impl Insert {
    pub(crate) fn execute(&self, scope: &mut Scope) -> Result<ResultSet> {
        let path = scope.expand(&self.target.path);
        tracing::debug!(target = %path, overwrite = self.overwrite, "executing insert");

        let mut sink =
            DataSourceFactory::output_source(&path, !self.overwrite, &self.target.hints)?;
        sink.open(scope)?;
        let written = self.write_rows(scope, sink.as_mut());
        // The sink closes whether or not the writes succeeded.
        let closed = sink.close();
        let count = written?;
        closed?;
        Ok(ResultSet::inserted(count, sink.statistics()))
    }

    fn write_rows(&self, scope: &Scope, sink: &mut dyn OutputSource) -> Result<u64> {
        let mut count = 0;
        for row in InputSource::execute(&self.source, scope)? {
            let row = row?;
            // Fields pair with the row's columns by position, not by name.
            if row.len() != self.fields.len() {
                return Err(Error::Runtime(format!(
                    "expected {} values, found {}",
                    self.fields.len(),
                    row.len()
                )));
            }
            let cells = self
                .fields
                .iter()
                .zip(row.into_values())
                .map(|(field, value)| (field.name.clone(), value))
                .collect();
            sink.write(&Row::new(cells))?;
            count += 1;
        }
        Ok(count)
    }
}
