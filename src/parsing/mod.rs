//! SQL parsing
//!
//! The lexer turns raw text into a position-tracked token stream; the
//! template parser drives that stream from declarative statement templates,
//! delegating to the expression and conditional parsers for placeholder
//! payloads; the compiler assembles executables from the extracted bags.

pub mod compiler;
pub mod condition;
pub mod expression;
pub mod lexer;
pub mod template;

pub use compiler::{compile_script, compile_statement};
pub use condition::parse_condition;
pub use expression::parse_expression;
pub use lexer::{Token, TokenKind, TokenStream};
pub use template::Template;

use crate::error::Result;
use crate::execution::Executable;

/// Parses a single SQL statement.
pub fn parse_statement(sql: &str) -> Result<Executable> {
    let mut ts = TokenStream::tokenize(sql)?;
    let statement = compile_statement(&mut ts)?;
    ts.next_if(";");
    if ts.has_next() {
        return Err(ts.error_here("unexpected trailing input"));
    }
    Ok(statement)
}
