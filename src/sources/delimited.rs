//! Delimited file driver (CSV, TSV, PSV)
//!
//! Reading is lazy: rows stream off the underlying reader and cell text is
//! coerced to the most specific value it parses as. Writing emits a header
//! row unless headers are disabled or an existing file is being appended.

use super::{InputSource, OutputSource, SourceHints};
use crate::error::{Error, Result};
use crate::execution::{IoStatistics, ResultSet, Row};
use crate::scope::Scope;
use crate::types::Value;
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::Instant;

pub struct DelimitedInput {
    path: PathBuf,
    delimiter: u8,
    hints: SourceHints,
}

impl DelimitedInput {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8, hints: SourceHints) -> Self {
        DelimitedInput {
            path: path.into(),
            delimiter,
            hints,
        }
    }
}

impl InputSource for DelimitedInput {
    fn execute(&self, _scope: &Scope) -> Result<ResultSet> {
        if !self.path.exists() {
            return Err(Error::Resolution(format!(
                "source not found: {}",
                self.path.display()
            )));
        }
        let bytes_in = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let has_headers = self.hints.headers.unwrap_or(true);

        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)?;

        let names: Option<Vec<String>> = if has_headers {
            Some(reader.headers()?.iter().map(String::from).collect())
        } else {
            self.hints.column_headers.clone()
        };

        let rows = reader.into_records().map(move |record| -> Result<Row> {
            let record = record?;
            let mut row = Row::default();
            for (i, cell) in record.iter().enumerate() {
                let name = match &names {
                    Some(names) => names
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("column_{}", i)),
                    None => format!("column_{}", i),
                };
                row.push(name, Value::parse_text(cell));
            }
            Ok(row)
        });

        Ok(ResultSet::lazy(rows).with_statistics(IoStatistics {
            bytes_in,
            ..IoStatistics::default()
        }))
    }
}

pub struct DelimitedOutput {
    path: PathBuf,
    delimiter: u8,
    append: bool,
    hints: SourceHints,
    writer: Option<csv::Writer<File>>,
    header_pending: bool,
    opened_at: Option<Instant>,
    statistics: IoStatistics,
}

impl DelimitedOutput {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8, append: bool, hints: SourceHints) -> Self {
        DelimitedOutput {
            path: path.into(),
            delimiter,
            append,
            hints,
            writer: None,
            header_pending: false,
            opened_at: None,
            statistics: IoStatistics::default(),
        }
    }
}

impl OutputSource for DelimitedOutput {
    fn open(&mut self, _scope: &Scope) -> Result<()> {
        let existing = self.append
            && self
                .path
                .metadata()
                .map(|m| m.len() > 0)
                .unwrap_or(false);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.append)
            .truncate(!self.append)
            .open(&self.path)?;
        let quote_style = if self.hints.quoted == Some(true) {
            QuoteStyle::Always
        } else {
            QuoteStyle::Necessary
        };
        self.writer = Some(
            WriterBuilder::new()
                .delimiter(self.delimiter)
                .quote_style(quote_style)
                .from_writer(file),
        );
        // The header lands before the first row so its names can come from
        // the row itself; appending to a non-empty file skips it.
        self.header_pending = self.hints.headers.unwrap_or(true) && !existing;
        self.opened_at = Some(Instant::now());
        Ok(())
    }

    fn write(&mut self, row: &Row) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Runtime("sink is not open".into()))?;
        if self.header_pending {
            let names = match &self.hints.column_headers {
                Some(names) => names.clone(),
                None => row.columns().map(String::from).collect(),
            };
            writer.write_record(&names)?;
            self.header_pending = false;
        }
        let cells: Vec<String> = row.values().map(Value::to_text).collect();
        self.statistics.bytes_out += cells.iter().map(|c| c.len() as u64 + 1).sum::<u64>();
        writer.write_record(&cells)?;
        self.statistics.rows_out += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        if let Some(opened_at) = self.opened_at.take() {
            self.statistics.elapsed_ms = opened_at.elapsed().as_millis() as u64;
        }
        Ok(())
    }

    fn statistics(&self) -> IoStatistics {
        self.statistics
    }
}
