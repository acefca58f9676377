//! # Boolean Validator
//!
//! Strict mode accepts only booleans. Lax mode also accepts the integers
//! `0`/`1` and, case-insensitively, the words `0 off f false n no` and
//! `1 on t true y yes`.

use serde::{Deserialize, Serialize};
use sieve_core::{ErrorType, LineError, SchemaDict, SchemaError, Value};

use super::{CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{is_strict, BuildContext, BuildValidator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolValidator {
    strict: bool,
}

impl BuildValidator for BoolValidator {
    const EXPECTED_TYPE: &'static str = "bool";

    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        Ok(CombinedValidator::Bool(Self { strict: is_strict(schema, ctx.config())? }))
    }
}

fn parse_bool(text: &str) -> Result<bool, ErrorType> {
    match text.to_lowercase().as_str() {
        "0" | "off" | "f" | "false" | "n" | "no" => Ok(false),
        "1" | "on" | "t" | "true" | "y" | "yes" => Ok(true),
        _ => Err(ErrorType::BoolParsing),
    }
}

impl Validator for BoolValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        let strict = state.strict_or(self.strict);
        let result = match input {
            Value::Bool(b) => Ok(*b),
            _ if strict => Err(ErrorType::BoolType),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Int(_) => Err(ErrorType::BoolParsing),
            Value::Str(s) => parse_bool(s),
            Value::WideStr(units) => String::from_utf16(units)
                .map_err(|_| ErrorType::BoolParsing)
                .and_then(|s| parse_bool(&s)),
            _ => Err(ErrorType::BoolType),
        };
        result.map(Value::Bool).map_err(|e| vec![LineError::new(e, input)])
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::{Config, Schema};

    fn run(strict: bool, input: Value) -> Result<Value, &'static str> {
        let v = BoolValidator { strict };
        v.validate(&input, &ValidationState::default()).map_err(|errors| errors[0].kind())
    }

    #[test]
    fn test_lax_words() {
        assert_eq!(run(false, Value::from("tRuE")), Ok(Value::Bool(true)));
        assert_eq!(run(false, Value::from("off")), Ok(Value::Bool(false)));
        assert_eq!(run(false, Value::Int(1)), Ok(Value::Bool(true)));
        assert_eq!(run(false, Value::from("maybe")), Err("bool_parsing"));
        assert_eq!(run(false, Value::Int(2)), Err("bool_parsing"));
        assert_eq!(run(false, Value::Float(1.0)), Err("bool_type"));
    }

    #[test]
    fn test_strict() {
        assert_eq!(run(true, Value::Bool(false)), Ok(Value::Bool(false)));
        assert_eq!(run(true, Value::from("true")), Err("bool_type"));
    }

    #[test]
    fn test_build_shorthand() {
        let config = Config::default();
        let v = BuildContext::new(&config).build(&Schema::from("bool")).unwrap();
        assert_eq!(v, CombinedValidator::Bool(BoolValidator { strict: false }));
    }
}
