//! NOW system function

use super::{Function, FunctionRegistry, FunctionSignature};
use crate::error::Result;
use crate::types::Value;
use std::sync::Arc;

pub struct NowFunction;

impl Function for NowFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature {
            name: "NOW",
            min_args: 0,
            max_args: Some(0),
            is_aggregate: false,
        };
        &SIGNATURE
    }

    fn execute(&self, _args: &[Value]) -> Result<Value> {
        Ok(Value::Timestamp(chrono::Utc::now().naive_utc()))
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(NowFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_a_timestamp() {
        assert!(matches!(
            NowFunction.execute(&[]).unwrap(),
            Value::Timestamp(_)
        ));
    }
}
