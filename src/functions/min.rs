//! MIN aggregate function

use super::{Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::Value;
use std::sync::Arc;

pub struct MinFunction;

impl Function for MinFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature {
            name: "MIN",
            min_args: 1,
            max_args: Some(1),
            is_aggregate: true,
        };
        &SIGNATURE
    }

    /// Per-row form: the value itself.
    fn execute(&self, args: &[Value]) -> Result<Value> {
        Ok(args[0].clone())
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(MinFunction));
}
