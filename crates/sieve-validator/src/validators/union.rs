//! # Union Validator
//!
//! Tries each choice in order and returns the first success. In lax mode
//! a strict pass over every choice runs first, so an exact-type match wins
//! over a coercing one (`"1"` stays text under `int | str`). If every
//! choice fails, the errors of all choices are reported together, each
//! location prefixed with the choice's kind label.

use serde::{Deserialize, Serialize};
use sieve_core::{LineError, SchemaDict, SchemaError, Value};

use super::{CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{is_strict, BuildContext, BuildValidator, SchemaDictExt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionValidator {
    strict: bool,
    choices: Vec<CombinedValidator>,
}

impl BuildValidator for UnionValidator {
    const EXPECTED_TYPE: &'static str = "union";

    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        let strict = is_strict(schema, ctx.config())?;
        let choices = schema
            .get_as_list("choices")?
            .ok_or_else(|| SchemaError::Schema("\"choices\" is required".to_string()))?;

        let choices = choices
            .items()
            .iter()
            .enumerate()
            .map(|(index, choice)| ctx.build(choice).map_err(|e| SchemaError::field(index, e)))
            .collect::<Result<Vec<_>, _>>()?;

        if choices.is_empty() {
            return Err(SchemaError::Schema("One or more union choices required".to_string()));
        }
        Ok(CombinedValidator::Union(Self { strict, choices }))
    }
}

impl Validator for UnionValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        if !state.strict_or(self.strict) {
            let strict_state = state.with_strict(true);
            if let Some(output) = self.choices.iter().find_map(|c| c.validate(input, &strict_state).ok()) {
                return Ok(output);
            }
        }

        let mut errors: Vec<LineError> = Vec::new();
        for choice in &self.choices {
            match choice.validate(input, state) {
                Ok(output) => return Ok(output),
                Err(choice_errors) => {
                    tracing::trace!(choice = choice.kind_label(), "union choice rejected input");
                    errors.extend(
                        choice_errors
                            .into_iter()
                            .map(|e| e.with_outer_location(choice.kind_label())),
                    );
                }
            }
        }
        Err(errors)
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}
