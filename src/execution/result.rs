//! Result rows and the lazy result stream

use crate::error::Result;
use crate::types::Value;

/// An ordered sequence of (column name, payload) cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new(cells: Vec<(String, Value)>) -> Self {
        Row { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The payload of the named column, matched case-sensitively.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.cells.push((column.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.cells.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|(_, value)| value)
    }

    pub fn into_values(self) -> impl Iterator<Item = Value> {
        self.cells.into_iter().map(|(_, value)| value)
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Transfer counters reported by source and sink drivers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoStatistics {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub rows_in: u64,
    pub rows_out: u64,
    pub elapsed_ms: u64,
}

enum RowStream {
    Eager(std::vec::IntoIter<Row>),
    Lazy(Box<dyn Iterator<Item = Result<Row>>>),
}

/// A finite stream of rows plus summary counters. Rows are pulled through
/// the iterator; driver-level row errors surface at consumption time.
pub struct ResultSet {
    rows: RowStream,
    /// Rows written by an INSERT, when the statement writes.
    pub inserted: Option<u64>,
    /// Driver transfer counters, when a driver was involved.
    pub statistics: Option<IoStatistics>,
}

impl std::fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSet")
            .field("inserted", &self.inserted)
            .field("statistics", &self.statistics)
            .finish()
    }
}

impl ResultSet {
    pub fn empty() -> Self {
        ResultSet::from_rows(Vec::new())
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        ResultSet {
            rows: RowStream::Eager(rows.into_iter()),
            inserted: None,
            statistics: None,
        }
    }

    pub fn lazy(rows: impl Iterator<Item = Result<Row>> + 'static) -> Self {
        ResultSet {
            rows: RowStream::Lazy(Box::new(rows)),
            inserted: None,
            statistics: None,
        }
    }

    /// The result of an INSERT: no rows, a write counter, and statistics.
    pub fn inserted(count: u64, statistics: IoStatistics) -> Self {
        ResultSet {
            rows: RowStream::Eager(Vec::new().into_iter()),
            inserted: Some(count),
            statistics: Some(statistics),
        }
    }

    pub fn with_statistics(mut self, statistics: IoStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Drains the stream into a vector, surfacing any deferred row error.
    pub fn collect_rows(self) -> Result<Vec<Row>> {
        self.collect()
    }
}

impl Iterator for ResultSet {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.rows {
            RowStream::Eager(rows) => rows.next().map(Ok),
            RowStream::Lazy(rows) => rows.next(),
        }
    }
}
