//! JSON file driver
//!
//! Reads either a top-level array of objects or one object per line, and
//! writes one object per line. Nested arrays and objects flatten to their
//! JSON text; the dialect has no nested payloads.

use super::{InputSource, OutputSource};
use crate::error::{Error, Result};
use crate::execution::{IoStatistics, ResultSet, Row};
use crate::scope::Scope;
use crate::types::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

pub struct JsonInput {
    path: PathBuf,
}

impl JsonInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonInput { path: path.into() }
    }
}

impl InputSource for JsonInput {
    fn execute(&self, _scope: &Scope) -> Result<ResultSet> {
        if !self.path.exists() {
            return Err(Error::Resolution(format!(
                "source not found: {}",
                self.path.display()
            )));
        }
        let text = std::fs::read_to_string(&self.path)?;
        let bytes_in = text.len() as u64;

        let mut rows = Vec::new();
        if text.trim_start().starts_with('[') {
            match serde_json::from_str::<serde_json::Value>(&text)? {
                serde_json::Value::Array(items) => {
                    for item in items {
                        rows.push(object_to_row(item, &self.path)?);
                    }
                }
                _ => {
                    return Err(Error::Runtime(format!(
                        "expected a JSON array in {}",
                        self.path.display()
                    )));
                }
            }
        } else {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                rows.push(object_to_row(serde_json::from_str(line)?, &self.path)?);
            }
        }

        let rows_in = rows.len() as u64;
        Ok(ResultSet::from_rows(rows).with_statistics(IoStatistics {
            bytes_in,
            rows_in,
            ..IoStatistics::default()
        }))
    }
}

fn object_to_row(item: serde_json::Value, path: &std::path::Path) -> Result<Row> {
    match item {
        serde_json::Value::Object(map) => {
            let mut row = Row::default();
            for (name, value) in map {
                row.push(name, json_to_value(value));
            }
            Ok(row)
        }
        _ => Err(Error::Runtime(format!(
            "expected JSON objects in {}",
            path.display()
        ))),
    }
}

fn json_to_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s),
        nested => Value::Str(nested.to_string()),
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(n) => serde_json::Value::from(*n),
        other => serde_json::Value::String(other.to_string()),
    }
}

pub struct JsonOutput {
    path: PathBuf,
    append: bool,
    file: Option<std::fs::File>,
    opened_at: Option<Instant>,
    statistics: IoStatistics,
}

impl JsonOutput {
    pub fn new(path: impl Into<PathBuf>, append: bool) -> Self {
        JsonOutput {
            path: path.into(),
            append,
            file: None,
            opened_at: None,
            statistics: IoStatistics::default(),
        }
    }
}

impl OutputSource for JsonOutput {
    fn open(&mut self, _scope: &Scope) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.append)
            .truncate(!self.append)
            .open(&self.path)?;
        self.file = Some(file);
        self.opened_at = Some(Instant::now());
        Ok(())
    }

    fn write(&mut self, row: &Row) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Error::Runtime("sink is not open".into()))?;
        let object: serde_json::Map<String, serde_json::Value> = row
            .iter()
            .map(|(name, value)| (name.clone(), value_to_json(value)))
            .collect();
        let line = serde_json::to_string(&object)?;
        self.statistics.bytes_out += line.len() as u64 + 1;
        writeln!(file, "{}", line)?;
        self.statistics.rows_out += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
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
