//! Data sources and sinks
//!
//! The engine consumes tabular data through the [`InputSource`] and
//! [`OutputSource`] traits; the [`DataSourceFactory`] resolves a path and a
//! hint bag into a concrete driver by file extension. Registered views
//! shadow paths before the factory is consulted (see `execution`).

pub mod delimited;
pub mod json;
pub mod memory;

pub use memory::LiteralSource;

use crate::error::{Error, Result};
use crate::execution::{IoStatistics, ResultSet, Row};
use crate::scope::Scope;
use std::path::Path;

/// A readable source of rows.
pub trait InputSource {
    fn execute(&self, scope: &Scope) -> Result<ResultSet>;
}

impl std::fmt::Debug for dyn InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn InputSource")
    }
}

/// A writable sink of rows. Usage is scoped: `open` before any `write`,
/// and `close` on every exit path, including failure.
pub trait OutputSource {
    fn open(&mut self, scope: &Scope) -> Result<()>;
    fn write(&mut self, row: &Row) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn statistics(&self) -> IoStatistics;
}

/// Driver configuration hints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceHints {
    pub delimiter: Option<u8>,
    pub quoted: Option<bool>,
    pub headers: Option<bool>,
    pub gzip: Option<bool>,
    pub append: Option<bool>,
    pub column_headers: Option<Vec<String>>,
}

/// A path plus the hints needed to resolve it into a driver.
#[derive(Clone, Debug, PartialEq)]
pub struct DataResource {
    pub path: String,
    pub hints: SourceHints,
}

impl DataResource {
    pub fn new(path: impl Into<String>) -> Self {
        DataResource {
            path: path.into(),
            hints: SourceHints::default(),
        }
    }
}

/// Resolves paths into drivers. Dispatch is by extension: `.csv`, `.tsv`
/// and `.psv` map to the delimited driver with the matching delimiter,
/// `.json` and `.jsonl` to the JSON driver.
pub struct DataSourceFactory;

impl DataSourceFactory {
    pub fn input_source(path: &str, hints: &SourceHints) -> Result<Box<dyn InputSource>> {
        reject_unsupported(path, hints)?;
        match format_of(path, hints)? {
            Format::Delimited(delimiter) => Ok(Box::new(delimited::DelimitedInput::new(
                path,
                delimiter,
                hints.clone(),
            ))),
            Format::Json => Ok(Box::new(json::JsonInput::new(path))),
        }
    }

    pub fn output_source(
        path: &str,
        append: bool,
        hints: &SourceHints,
    ) -> Result<Box<dyn OutputSource>> {
        reject_unsupported(path, hints)?;
        let append = hints.append.unwrap_or(append);
        match format_of(path, hints)? {
            Format::Delimited(delimiter) => Ok(Box::new(delimited::DelimitedOutput::new(
                path,
                delimiter,
                append,
                hints.clone(),
            ))),
            Format::Json => Ok(Box::new(json::JsonOutput::new(path, append))),
        }
    }
}

enum Format {
    Delimited(u8),
    Json,
}

fn format_of(path: &str, hints: &SourceHints) -> Result<Format> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => Ok(Format::Delimited(hints.delimiter.unwrap_or(b','))),
        Some("tsv") => Ok(Format::Delimited(hints.delimiter.unwrap_or(b'\t'))),
        Some("psv") => Ok(Format::Delimited(hints.delimiter.unwrap_or(b'|'))),
        Some("json") | Some("jsonl") => Ok(Format::Json),
        _ => Err(Error::Resolution(format!(
            "no driver for source: {}",
            path
        ))),
    }
}

fn reject_unsupported(path: &str, hints: &SourceHints) -> Result<()> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Err(Error::Resolution(format!(
            "no driver for URL-addressed source: {}",
            path
        )));
    }
    if hints.gzip == Some(true) {
        return Err(Error::Runtime(
            "the gzip hint is not supported by the bundled drivers".into(),
        ));
    }
    Ok(())
}
