//! Error types for the query engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Raised by the tokenizer, the expression/conditional parsers, and the
    /// template parser. Carries the offending token and its position.
    #[error("Syntax error: {message} at line {line}, column {column}")]
    Syntax {
        message: String,
        token: Option<String>,
        line: u32,
        column: u32,
    },

    /// A name, path, or view could not be resolved in scope.
    #[error("Unresolved reference: {0}")]
    Resolution(String),

    /// Evaluation failure: type mismatch, division by zero, unopened sink.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Surfaced from source/sink drivers; wrapped but never swallowed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Programmer error, e.g. a template slot collision.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// A syntax error with no position, for failures before any token exists.
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax {
            message: message.into(),
            token: None,
            line: 0,
            column: 0,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Runtime(format!("invalid pattern: {}", err))
    }
}
