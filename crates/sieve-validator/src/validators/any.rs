//! # Any Validator
//!
//! `{"type": "any"}`: the identity node.

use serde::{Deserialize, Serialize};
use sieve_core::{SchemaDict, SchemaError, Value};

use super::{CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{BuildContext, BuildValidator};

/// Accepts every input unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyValidator;

impl BuildValidator for AnyValidator {
    const EXPECTED_TYPE: &'static str = "any";

    fn build(_schema: &SchemaDict, _ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        Ok(CombinedValidator::Any(Self))
    }
}

impl Validator for AnyValidator {
    fn validate(&self, input: &Value, _state: &ValidationState) -> ValResult<Value> {
        Ok(input.clone())
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}
