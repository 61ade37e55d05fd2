//! Dynamically scoped evaluation environment
//!
//! A scope is a chain of frames. Lookups walk from the local frame toward
//! the root; writes land in the local frame and never escape upward. A
//! statement executes against its own frame, and row evaluation extends it
//! with a row-bound child frame.

use crate::execution::{Executable, Row};
use crate::functions::{self, Function};
use crate::types::Value;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Policy for function references that resolve to nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingFunctions {
    /// Evaluate to NULL silently.
    #[default]
    Null,
    /// Raise a resolution error.
    Error,
}

/// Engine-wide configuration, held by the root scope frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub missing_function: MissingFunctions,
}

static DEFAULT_OPTIONS: EngineOptions = EngineOptions {
    missing_function: MissingFunctions::Null,
};

/// One frame in the scope chain.
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    options: Option<EngineOptions>,
    variables: HashMap<String, Value>,
    views: HashMap<String, Executable>,
    functions: HashMap<String, Arc<dyn Function>>,
    row: Option<&'a Row>,
}

impl<'a> Scope<'a> {
    /// A root frame with default options.
    pub fn root() -> Scope<'static> {
        Scope::with_options(EngineOptions::default())
    }

    /// A root frame with the given options.
    pub fn with_options(options: EngineOptions) -> Scope<'static> {
        Scope {
            parent: None,
            options: Some(options),
            variables: HashMap::new(),
            views: HashMap::new(),
            functions: HashMap::new(),
            row: None,
        }
    }

    /// A child frame extending this one.
    pub fn child(&self) -> Scope<'_> {
        Scope {
            parent: Some(self),
            options: None,
            variables: HashMap::new(),
            views: HashMap::new(),
            functions: HashMap::new(),
            row: None,
        }
    }

    /// A child frame with a row bound for field resolution.
    pub fn with_row<'b>(&'b self, row: &'b Row) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope {
            parent: Some(self),
            options: None,
            variables: HashMap::new(),
            views: HashMap::new(),
            functions: HashMap::new(),
            row: Some(row),
        }
    }

    /// The engine options, found on the nearest frame that carries them.
    pub fn options(&self) -> &EngineOptions {
        match (&self.options, self.parent) {
            (Some(options), _) => options,
            (None, Some(parent)) => parent.options(),
            (None, None) => &DEFAULT_OPTIONS,
        }
    }

    /// Binds a variable in the local frame, shadowing any parent binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Looks up a variable by name, walking the chain.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.variables
            .get(name)
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }

    /// Resolves a field reference: the bound row first (case-sensitive
    /// column match), then variables, then the parent chain.
    pub fn lookup_field(&self, name: &str) -> Option<Value> {
        if let Some(row) = self.row {
            if let Some(value) = row.get(name) {
                return Some(value.clone());
            }
        }
        if let Some(value) = self.variables.get(name) {
            return Some(value.clone());
        }
        self.parent.and_then(|p| p.lookup_field(name))
    }

    /// Registers a view in the local frame.
    pub fn register_view(&mut self, name: impl Into<String>, executable: Executable) {
        self.views.insert(name.into(), executable);
    }

    /// Looks up a view by name or path, walking the chain.
    pub fn lookup_view(&self, name: &str) -> Option<&Executable> {
        self.views
            .get(name)
            .or_else(|| self.parent.and_then(|p| p.lookup_view(name)))
    }

    /// Registers a function in the local frame. Names are case-insensitive.
    pub fn register_function(&mut self, function: Arc<dyn Function>) {
        let name = function.signature().name.to_ascii_uppercase();
        self.functions.insert(name, function);
    }

    /// Resolves a function reference: local registrations first, then the
    /// parent chain, then the built-in registry.
    pub fn lookup_function(&self, name: &str) -> Option<Arc<dyn Function>> {
        let key = name.to_ascii_uppercase();
        if let Some(function) = self.functions.get(&key) {
            return Some(function.clone());
        }
        match self.parent {
            Some(parent) => parent.lookup_function(name),
            None => functions::lookup(name),
        }
    }

    /// Interpolates `${var}` and `$var` references in the given text.
    /// Unknown variables are left untouched.
    pub fn expand(&self, text: &str) -> String {
        static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap()
        });
        PATTERN
            .replace_all(text, |caps: &regex::Captures| {
                let name = caps.get(1).or_else(|| caps.get(2)).unwrap().as_str();
                match self.lookup(name) {
                    Some(value) => value.to_string(),
                    None => caps.get(0).unwrap().as_str().to_string(),
                }
            })
            .into_owned()
    }
}
