//! COUNT aggregate function

use super::{Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::Value;
use std::sync::Arc;

pub struct CountFunction;

impl Function for CountFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature {
            name: "COUNT",
            min_args: 1,
            max_args: Some(1),
            is_aggregate: true,
        };
        &SIGNATURE
    }

    /// Per-row form: 1 for a countable value, 0 for NULL. The group fold
    /// lives in the select executor.
    fn execute(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Integer(0)),
            _ => Ok(Value::Integer(1)),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(CountFunction));
}
