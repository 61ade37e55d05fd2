//! AVG aggregate function

use super::{Function, FunctionRegistry, FunctionSignature};
use crate::error::{Error, Result};
use crate::types::Value;
use std::sync::Arc;

pub struct AvgFunction;

impl Function for AvgFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature {
            name: "AVG",
            min_args: 1,
            max_args: Some(1),
            is_aggregate: true,
        };
        &SIGNATURE
    }

    /// Per-row form: the value itself, which must be numeric or NULL.
    fn execute(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            value if value.is_null() || value.is_numeric() => Ok(value.clone()),
            other => Err(Error::Runtime(format!("can't average {}", other.kind()))),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(AvgFunction));
}
