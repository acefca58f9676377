//! # Nullable Validator
//!
//! `{"type": "nullable", "schema": <description>}`. `None` input never
//! reaches the inner validator.

use serde::{Deserialize, Serialize};
use sieve_core::{SchemaDict, SchemaError, Value};

use super::{CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{BuildContext, BuildValidator, SchemaDictExt};

/// Passes `None` through; anything else goes to the wrapped validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullableValidator {
    validator: Box<CombinedValidator>,
}

impl BuildValidator for NullableValidator {
    const EXPECTED_TYPE: &'static str = "nullable";

    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        let inner = schema.get_required("schema")?;
        let validator = ctx.build(&inner)?;
        Ok(CombinedValidator::Nullable(Self { validator: Box::new(validator) }))
    }
}

impl Validator for NullableValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        match input {
            Value::None => Ok(Value::None),
            _ => self.validator.validate(input, state),
        }
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}
