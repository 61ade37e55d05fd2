//! LENGTH string function

use super::{Function, FunctionRegistry, FunctionSignature};
use crate::error::{Error, Result};
use crate::types::Value;
use std::sync::Arc;

pub struct LengthFunction;

impl Function for LengthFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIGNATURE: FunctionSignature = FunctionSignature {
            name: "LENGTH",
            min_args: 1,
            max_args: Some(1),
            is_aggregate: false,
        };
        &SIGNATURE
    }

    fn execute(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Str(s) => Ok(Value::Integer(s.chars().count() as i64)),
            other => Err(Error::Runtime(format!(
                "LENGTH expects a string, found {}",
                other.kind()
            ))),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Arc::new(LengthFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(
            LengthFunction.execute(&[Value::Str("hello".into())]).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(LengthFunction.execute(&[Value::Null]).unwrap(), Value::Null);
        assert!(LengthFunction.execute(&[Value::Integer(1)]).is_err());
    }
}
