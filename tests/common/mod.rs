//! Common test utilities for the integration tests
#![allow(dead_code)]

use qwery::{Engine, ResultSet, Row};
use std::path::Path;
use tempfile::TempDir;

/// Test context: an engine plus a scratch directory for fixture files.
pub struct TestContext {
    pub engine: Engine,
    dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        TestContext {
            engine: Engine::new(),
            dir: TempDir::new().expect("temp dir"),
        }
    }

    /// Writes a fixture file into the scratch directory and returns its
    /// absolute path.
    pub fn fixture(&self, name: &str, content: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path.to_string_lossy().into_owned()
    }

    /// A path inside the scratch directory that may not exist yet.
    pub fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    /// Executes a single statement, panicking on error.
    pub fn exec(&mut self, sql: &str) -> ResultSet {
        self.engine
            .execute_statement(sql)
            .unwrap_or_else(|err| panic!("statement failed: {}\n  {}", sql, err))
    }

    /// Executes a single statement and drains its rows.
    pub fn rows(&mut self, sql: &str) -> Vec<Row> {
        self.exec(sql).collect_rows().expect("rows")
    }
}

/// The standard tickers fixture. One row has an empty LastSale cell, which
/// reads back as NULL.
pub const TICKERS_CSV: &str = "\
Symbol,LastSale,Sector
AAPL,150.25,Tech
GOOG,120.50,Tech
XYZ,0.75,Finance
ABC,0.50,Tech
QRS,0.99,Energy
NONE,,Energy
";

pub fn setup_tickers() -> (TestContext, String) {
    let ctx = TestContext::new();
    let path = ctx.fixture("tickers.csv", TICKERS_CSV);
    (ctx, path)
}

/// Reads a file's text, for asserting on written output.
pub fn read_file(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).expect("read file")
}
