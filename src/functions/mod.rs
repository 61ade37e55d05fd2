//! Scalar and aggregate function definitions and registry
//!
//! Functions are looked up by name at evaluation time, never at parse
//! time. The registry holds the built-ins; scopes may register their own,
//! which shadow these. The aggregate entries here define the per-row form;
//! actual accumulation happens in the select executor.

use crate::error::Result;
use crate::types::Value;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

// Aggregate functions
mod avg;
mod count;
mod max;
mod min;
mod sum;

// String functions
mod length;
mod lower;
mod trim;
mod upper;

// System functions
mod now;

/// Metadata about a function's call shape.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    /// Function name (uppercase).
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: Option<usize>,
    /// Whether this function folds a group rather than a single row.
    pub is_aggregate: bool,
}

/// A callable function.
pub trait Function: Send + Sync {
    fn signature(&self) -> &FunctionSignature;

    /// Invokes the function with evaluated argument values.
    fn execute(&self, args: &[Value]) -> Result<Value>;
}

/// Registry of the built-in functions.
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        count::register(&mut registry);
        sum::register(&mut registry);
        avg::register(&mut registry);
        min::register(&mut registry);
        max::register(&mut registry);

        length::register(&mut registry);
        upper::register(&mut registry);
        lower::register(&mut registry);
        trim::register(&mut registry);

        now::register(&mut registry);

        registry
    }

    fn register(&mut self, function: Arc<dyn Function>) {
        let name = function.signature().name.to_string();
        self.functions.insert(name, function);
    }
}

static REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::new);

/// Looks up a built-in function by name, case-insensitively.
pub fn lookup(name: &str) -> Option<Arc<dyn Function>> {
    REGISTRY.functions.get(&name.to_ascii_uppercase()).cloned()
}

/// Whether the named built-in is an aggregate.
pub fn is_aggregate(name: &str) -> bool {
    lookup(name).is_some_and(|f| f.signature().is_aggregate)
}
