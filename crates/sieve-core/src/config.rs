//! # Ambient Configuration
//!
//! Engine-wide defaults applied when a schema node does not set the
//! corresponding constraint itself. Keys are scoped by leaf kind
//! (`str_max_length`, `int_ge`, ...) plus the global `strict` flag.
//!
//! ## Precedence
//!
//! Most specific wins:
//!
//! 1. the `strict` argument of a validate call,
//! 2. the node's own constraint field,
//! 3. this configuration,
//! 4. the engine default (lax, unconstrained).
//!
//! Levels 2–3 are resolved once at compile time; level 1 is applied per
//! call by the validation runtime.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Ambient validator configuration. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default strictness for every node.
    pub strict: Option<bool>,
    /// Name used for the validator in error reports.
    pub title: Option<String>,
    pub str_min_length: Option<usize>,
    pub str_max_length: Option<usize>,
    pub str_strip_whitespace: Option<bool>,
    pub str_to_lower: Option<bool>,
    pub str_to_upper: Option<bool>,
    pub int_gt: Option<i64>,
    pub int_ge: Option<i64>,
    pub int_lt: Option<i64>,
    pub int_le: Option<i64>,
}

impl Config {
    /// Parse a configuration mapping.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Config` if a recognized key has the wrong type.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SchemaError> {
        Self::deserialize(value).map_err(|e| SchemaError::Config(e.to_string()))
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_str_min_length(mut self, min_length: usize) -> Self {
        self.str_min_length = Some(min_length);
        self
    }

    pub fn with_str_max_length(mut self, max_length: usize) -> Self {
        self.str_max_length = Some(max_length);
        self
    }
}
