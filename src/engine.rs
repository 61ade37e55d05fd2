//! Engine facade
//!
//! Owns the root scope a session executes against: variables defined here
//! and views created by statements persist across calls.

use crate::error::Result;
use crate::execution::ResultSet;
use crate::functions::Function;
use crate::parsing;
use crate::scope::{EngineOptions, Scope};
use crate::types::Value;
use std::sync::Arc;

pub struct Engine {
    scope: Scope<'static>,
}

impl Engine {
    pub fn new() -> Self {
        Engine::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Engine {
            scope: Scope::with_options(options),
        }
    }

    /// Binds a session variable, visible to `${var}` expansion and field
    /// resolution in every statement.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.scope.define(name, value);
    }

    /// Registers a session function, shadowing any built-in of the same
    /// name.
    pub fn register_function(&mut self, function: Arc<dyn Function>) {
        self.scope.register_function(function);
    }

    /// Compiles and executes a script of semicolon-separated statements,
    /// returning one result set per statement.
    pub fn execute(&mut self, sql: &str) -> Result<Vec<ResultSet>> {
        tracing::debug!(sql, "executing script");
        let statements = parsing::compile_script(sql)?;
        let mut results = Vec::with_capacity(statements.len());
        for statement in &statements {
            results.push(statement.execute(&mut self.scope)?);
        }
        Ok(results)
    }

    /// Compiles and executes a single statement.
    pub fn execute_statement(&mut self, sql: &str) -> Result<ResultSet> {
        let statement = parsing::parse_statement(sql)?;
        statement.execute(&mut self.scope)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
