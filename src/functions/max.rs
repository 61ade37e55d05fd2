//! MAX aggregate function

use super::{Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::Value;
use std::sync::Arc;

pub struct MaxFunction;

impl Function for MaxFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature {
            name: "MAX",
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
    registry.register(Arc::new(MaxFunction));
}
