//! # Schema Validator
//!
//! The public entry point: compile a description once, then validate any
//! number of inputs against the resulting tree.
//!
//! ## Thread Safety
//!
//! `SchemaValidator` is `Send + Sync`. The compiled tree is never mutated
//! after construction and every validate call carries its own
//! [`ValidationState`], so one instance can serve concurrent callers
//! without locking.

use serde::{Deserialize, Serialize};
use sieve_core::{Config, ErrorType, LineError, Schema, SchemaDict, SchemaError, ValidationError, Value};

use crate::build::{BuildContext, SchemaDictExt};
use crate::validators::{CombinedValidator, ValidationState, Validator};

/// A compiled, reusable validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaValidator {
    title: String,
    validator: CombinedValidator,
}

impl SchemaValidator {
    /// Compile `schema` under the optional ambient `config`.
    ///
    /// `schema` is either a bare type name (`"int"`) or a description
    /// record with a `"type"` key.
    ///
    /// # Errors
    ///
    /// Returns the chained [`SchemaError`] of the first failure. A schema
    /// of any other shape fails with `SchemaError::Root`.
    pub fn new(schema: &Schema, config: Option<&Config>) -> Result<Self, SchemaError> {
        let default_config = Config::default();
        let config = config.unwrap_or(&default_config);

        let title = match schema {
            Schema::Str(_) => None,
            Schema::Dict(dict) => schema_title(dict)?,
            other => {
                return Err(SchemaError::root(SchemaError::Type(format!(
                    "'{}' object cannot be converted to 'str'",
                    other.type_name()
                ))))
            }
        };

        let validator = BuildContext::new(config).build(schema)?;
        let title = title
            .or_else(|| config.title.clone())
            .unwrap_or_else(|| validator.kind_label().to_string());

        tracing::debug!(kind = validator.kind_label(), title = %title, "schema validator compiled");
        Ok(Self { title, validator })
    }

    /// The name used for this validator in error reports.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The root of the compiled tree.
    pub fn root(&self) -> &CombinedValidator {
        &self.validator
    }

    /// Validate `input`, returning the coerced output.
    ///
    /// `strict`, when given, overrides every node's own strictness for
    /// this call.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] holding every violation found.
    pub fn validate(&self, input: &Value, strict: Option<bool>) -> Result<Value, ValidationError> {
        self.validator
            .validate(input, &ValidationState::new(strict))
            .map_err(|line_errors| ValidationError::new(self.title.clone(), line_errors))
    }

    /// Parse `json` and validate the resulting value.
    ///
    /// # Errors
    ///
    /// Malformed JSON yields a single `json_invalid` entry; otherwise as
    /// for [`validate`](Self::validate).
    pub fn validate_json(&self, json: &str, strict: Option<bool>) -> Result<Value, ValidationError> {
        let parsed: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            let line = LineError::new(ErrorType::JsonInvalid { error: e.to_string() }, &Value::from(json));
            ValidationError::new(self.title.clone(), vec![line])
        })?;
        self.validate(&Value::from(parsed), strict)
    }

    /// Run the same pipeline as [`validate`](Self::validate) and report
    /// only whether it succeeded.
    pub fn is_valid(&self, input: &Value, strict: Option<bool>) -> bool {
        self.validator.validate(input, &ValidationState::new(strict)).is_ok()
    }

    /// Textual introspection of the compiled tree.
    ///
    /// Deterministic for a given tree, so a deserialized copy describes
    /// itself identically. Record fields appear as `RecordField { .. }`.
    pub fn describe(&self) -> String {
        format!("SchemaValidator(title={:?}, validator={:?})", self.title, self.validator)
    }
}

fn schema_title(dict: &SchemaDict) -> Result<Option<String>, SchemaError> {
    dict.get_as_str("title").map_err(SchemaError::root)
}
