//! # List Validator
//!
//! `{"type": "list", "items_schema": <description>, "min_items": int,
//! "max_items": int}`. Without `items_schema` every element is accepted
//! as is.

use serde::{Deserialize, Serialize};
use sieve_core::{ErrorType, LineError, SchemaDict, SchemaError, Value};

use super::{AnyValidator, CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{BuildContext, BuildValidator, SchemaDictExt};

/// Validates a sequence element by element.
///
/// Element failures are collected across the whole input, each located by
/// its index. Length bounds are checked on the input before any element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListValidator {
    items: Box<CombinedValidator>,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl BuildValidator for ListValidator {
    const EXPECTED_TYPE: &'static str = "list";

    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        let items = match schema.get("items_schema") {
            Some(items) => ctx.build(&items).map_err(|e| SchemaError::field("items_schema", e))?,
            None => CombinedValidator::Any(AnyValidator),
        };
        Ok(CombinedValidator::List(Self {
            items: Box::new(items),
            min_items: schema.get_as_usize("min_items")?,
            max_items: schema.get_as_usize("max_items")?,
        }))
    }
}

impl Validator for ListValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        let Value::List(elements) = input else {
            return Err(vec![LineError::new(ErrorType::ListType, input)]);
        };

        if let Some(min_items) = self.min_items {
            if elements.len() < min_items {
                return Err(vec![LineError::new(ErrorType::ListTooShort { min_items }, input)]);
            }
        }
        if let Some(max_items) = self.max_items {
            if elements.len() > max_items {
                return Err(vec![LineError::new(ErrorType::ListTooLong { max_items }, input)]);
            }
        }

        let mut output = Vec::with_capacity(elements.len());
        let mut errors = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            match self.items.validate(element, state) {
                Ok(value) => output.push(value),
                Err(element_errors) => {
                    errors.extend(element_errors.into_iter().map(|e| e.with_outer_location(index)));
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::List(output))
        } else {
            Err(errors)
        }
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}
