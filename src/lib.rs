//! Qwery: a SQL-dialect query engine for tabular data
//!
//! Statements address data by path: delimited files, JSON records, and
//! registered views. The parser is template-driven: each statement's shape
//! is a declarative template string (see [`parsing::template`]) whose
//! placeholders pull typed fragments off a shared token stream through the
//! expression and conditional parsers. Compiled statements execute against
//! a dynamically scoped environment and yield row streams.
//!
//! ```no_run
//! use qwery::Engine;
//!
//! let mut engine = Engine::new();
//! let results = engine.execute(
//!     "SELECT Symbol, LastSale FROM './tickers.csv' \
//!      WHERE LastSale < 1.00 ORDER BY Symbol DESC LIMIT 5",
//! )?;
//! for row in results.into_iter().flatten() {
//!     println!("{:?}", row?);
//! }
//! # Ok::<(), qwery::Error>(())
//! ```

pub mod engine;
pub mod error;
pub mod execution;
pub mod functions;
pub mod parsing;
pub mod scope;
pub mod sources;
pub mod types;

pub use engine::Engine;
pub use error::{Error, Result};
pub use execution::{Executable, IoStatistics, ResultSet, Row};
pub use functions::{Function, FunctionSignature};
pub use parsing::{parse_statement, TokenStream};
pub use scope::{EngineOptions, MissingFunctions, Scope};
pub use sources::{DataResource, DataSourceFactory, InputSource, OutputSource, SourceHints};
pub use types::{Condition, Expression, Field, SortOrder, Value};
