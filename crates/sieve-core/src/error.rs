//! # Error Types — Build and Validation Failures
//!
//! Two families, both derived with `thiserror` or implementing
//! `std::error::Error` directly:
//!
//! - [`SchemaError`]: raised while compiling a schema description. A
//!   chain of causes, each level either a leaf failure (type mismatch,
//!   unknown type, bad pattern, cycle) or a wrapper naming the validator
//!   kind or field that produced it. Rendered as a flat, two-space
//!   indented chain; no level is dropped when an outer node re-wraps.
//! - [`ValidationError`]: raised while validating input. An ordered list
//!   of [`LineError`]s, each carrying a machine-readable kind, the exact
//!   location from the tree root, a message, the offending input value and
//!   optional kind-specific context.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::value::Value;

/// One step of a location path: a record key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocItem {
    Key(String),
    Index(usize),
}

impl fmt::Display for LocItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for LocItem {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for LocItem {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for LocItem {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Path from the validator tree root to a failing node, outermost first.
pub type Location = Vec<LocItem>;

// ---------------------------------------------------------------------------
// Build-time errors
// ---------------------------------------------------------------------------

/// Failure while compiling a schema description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The `type` discriminant names no known validator kind.
    #[error("Unknown schema type: \"{0}\"")]
    UnknownType(String),

    /// A description value had the wrong primitive type.
    #[error("{0}")]
    Type(String),

    /// A description value had the right type but an unusable value.
    #[error("{0}")]
    Value(String),

    /// Any other malformed description, e.g. a pattern that fails to parse.
    #[error("{0}")]
    Schema(String),

    /// A description object appeared inside itself.
    #[error("Recursion error - cyclic reference detected")]
    Cycle,

    /// Nesting went past the compiler's depth ceiling.
    #[error("Recursion error - maximum schema depth of {0} exceeded")]
    DepthExceeded(usize),

    /// The ambient configuration could not be parsed.
    #[error("Invalid config: {0}")]
    Config(String),

    /// Failure inside the builder for one validator kind.
    #[error("Error building \"{kind}\" validator:\n  {}", .cause.chained())]
    Building { kind: String, cause: Box<SchemaError> },

    /// Failure inside a named field or indexed item of a composite kind.
    #[error("{} \"{field}\":\n  {}", .field.label(), .cause.chained())]
    Field { field: BuildField, cause: Box<SchemaError> },

    /// The top-level description had an unsupported shape.
    #[error("Schema build error:\n  {}", .cause.chained())]
    Root { cause: Box<SchemaError> },
}

impl SchemaError {
    /// Class label shown when this error is nested under another.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Type(_) => "TypeError",
            Self::Value(_) => "ValueError",
            _ => "SchemaError",
        }
    }

    /// `"<class>: <message>"`, the form used for a nested cause.
    pub fn chained(&self) -> String {
        format!("{}: {}", self.class_name(), self)
    }

    /// Wrap as the cause of a failure building `kind`.
    pub fn building(kind: impl Into<String>, cause: SchemaError) -> Self {
        Self::Building { kind: kind.into(), cause: Box::new(cause) }
    }

    /// Wrap as the cause of a failure in `field`.
    pub fn field(field: impl Into<BuildField>, cause: SchemaError) -> Self {
        Self::Field { field: field.into(), cause: Box::new(cause) }
    }

    /// Wrap as a top-level shape failure.
    pub fn root(cause: SchemaError) -> Self {
        Self::Root { cause: Box::new(cause) }
    }

    /// Number of chained levels, counting this one.
    pub fn depth(&self) -> usize {
        match self {
            Self::Building { cause, .. } | Self::Field { cause, .. } | Self::Root { cause } => 1 + cause.depth(),
            _ => 1,
        }
    }

    /// The innermost cause of the chain.
    pub fn root_cause(&self) -> &SchemaError {
        match self {
            Self::Building { cause, .. } | Self::Field { cause, .. } | Self::Root { cause } => cause.root_cause(),
            other => other,
        }
    }
}

/// The position inside a composite description that produced a build error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildField {
    /// A named field of a record.
    Name(String),
    /// A position in a list of descriptions, e.g. a union choice.
    Index(usize),
}

impl BuildField {
    fn label(&self) -> &'static str {
        match self {
            Self::Name(_) => "Field",
            Self::Index(_) => "Item",
        }
    }
}

impl fmt::Display for BuildField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for BuildField {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for BuildField {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for BuildField {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

// ---------------------------------------------------------------------------
// Run-time errors
// ---------------------------------------------------------------------------

/// The reason one input value was rejected, with any kind-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorType {
    StrType,
    StrUnicode,
    TooShort { min_length: usize },
    TooLong { max_length: usize },
    StrPatternMismatch { pattern: String },
    IntType,
    IntParsing,
    IntFromFloat,
    GreaterThan { gt: i64 },
    GreaterThanEqual { ge: i64 },
    LessThan { lt: i64 },
    LessThanEqual { le: i64 },
    MultipleOf { multiple_of: i64 },
    BoolType,
    BoolParsing,
    ListType,
    ListTooShort { min_items: usize },
    ListTooLong { max_items: usize },
    DictType,
    Missing,
    ExtraForbidden,
    JsonInvalid { error: String },
}

impl ErrorType {
    /// Machine-readable kind, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StrType => "str_type",
            Self::StrUnicode => "str_unicode",
            Self::TooShort { .. } | Self::ListTooShort { .. } => "too_short",
            Self::TooLong { .. } | Self::ListTooLong { .. } => "too_long",
            Self::StrPatternMismatch { .. } => "str_pattern_mismatch",
            Self::IntType => "int_type",
            Self::IntParsing => "int_parsing",
            Self::IntFromFloat => "int_from_float",
            Self::GreaterThan { .. } => "greater_than",
            Self::GreaterThanEqual { .. } => "greater_than_equal",
            Self::LessThan { .. } => "less_than",
            Self::LessThanEqual { .. } => "less_than_equal",
            Self::MultipleOf { .. } => "multiple_of",
            Self::BoolType => "bool_type",
            Self::BoolParsing => "bool_parsing",
            Self::ListType => "list_type",
            Self::DictType => "dict_type",
            Self::Missing => "missing",
            Self::ExtraForbidden => "extra_forbidden",
            Self::JsonInvalid { .. } => "json_invalid",
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::StrType => "Input should be a valid string".to_string(),
            Self::StrUnicode => {
                "Input should be a valid string, unable to parse raw data as a unicode string".to_string()
            }
            Self::TooShort { min_length } => format!("String should have at least {min_length} characters"),
            Self::TooLong { max_length } => format!("String should have at most {max_length} characters"),
            Self::StrPatternMismatch { pattern } => format!("String should match pattern '{pattern}'"),
            Self::IntType => "Value must be a valid integer".to_string(),
            Self::IntParsing => "Value must be a valid integer, unable to parse string as an integer".to_string(),
            Self::IntFromFloat => "Value must be a valid integer, got a number with a fractional part".to_string(),
            Self::GreaterThan { gt } => format!("Value must be greater than {gt}"),
            Self::GreaterThanEqual { ge } => format!("Value must be greater than or equal to {ge}"),
            Self::LessThan { lt } => format!("Value must be less than {lt}"),
            Self::LessThanEqual { le } => format!("Value must be less than or equal to {le}"),
            Self::MultipleOf { multiple_of } => format!("Value must be a multiple of {multiple_of}"),
            Self::BoolType => "Value must be a valid boolean".to_string(),
            Self::BoolParsing => "Value must be a valid boolean, unable to interpret input".to_string(),
            Self::ListType => "Value must be a valid list".to_string(),
            Self::ListTooShort { min_items } => format!("List should have at least {min_items} items"),
            Self::ListTooLong { max_items } => format!("List should have at most {max_items} items"),
            Self::DictType => "Value must be a valid dictionary".to_string(),
            Self::Missing => "Field required".to_string(),
            Self::ExtraForbidden => "Extra values are not permitted".to_string(),
            Self::JsonInvalid { error } => format!("Invalid JSON: {error}"),
        }
    }

    /// Kind-specific structured data, if any.
    pub fn context(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        let (key, value) = match self {
            Self::TooShort { min_length } => ("min_length", serde_json::Value::from(*min_length)),
            Self::TooLong { max_length } => ("max_length", serde_json::Value::from(*max_length)),
            Self::StrPatternMismatch { pattern } => ("pattern", serde_json::Value::from(pattern.as_str())),
            Self::GreaterThan { gt } => ("gt", serde_json::Value::from(*gt)),
            Self::GreaterThanEqual { ge } => ("ge", serde_json::Value::from(*ge)),
            Self::LessThan { lt } => ("lt", serde_json::Value::from(*lt)),
            Self::LessThanEqual { le } => ("le", serde_json::Value::from(*le)),
            Self::MultipleOf { multiple_of } => ("multiple_of", serde_json::Value::from(*multiple_of)),
            Self::ListTooShort { min_items } => ("min_items", serde_json::Value::from(*min_items)),
            Self::ListTooLong { max_items } => ("max_items", serde_json::Value::from(*max_items)),
            Self::JsonInvalid { error } => ("error", serde_json::Value::from(error.as_str())),
            _ => return None,
        };
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), value);
        Some(map)
    }
}

/// One entry of a validation error report.
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    pub error_type: ErrorType,
    pub loc: Location,
    pub input_value: Value,
}

impl LineError {
    /// A failure at the current node; the location is filled in by callers.
    pub fn new(error_type: ErrorType, input_value: &Value) -> Self {
        Self { error_type, loc: Vec::new(), input_value: input_value.clone() }
    }

    /// Prefix the location with the key or index this error was found under.
    pub fn with_outer_location(mut self, item: impl Into<LocItem>) -> Self {
        self.loc.insert(0, item.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        self.error_type.kind()
    }

    pub fn message(&self) -> String {
        self.error_type.message()
    }

    pub fn context(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        self.error_type.context()
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.loc.is_empty() {
            let path: Vec<String> = self.loc.iter().map(ToString::to_string).collect();
            writeln!(f, "{}", path.join(" -> "))?;
        }
        write!(
            f,
            "  {} [kind={}, input_value={}, input_type={}]",
            self.message(),
            self.kind(),
            self.input_value.repr(),
            self.input_value.type_name(),
        )
    }
}

impl Serialize for LineError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let context = self.context();
        let mut map = serializer.serialize_map(Some(if context.is_some() { 5 } else { 4 }))?;
        map.serialize_entry("kind", self.kind())?;
        map.serialize_entry("loc", &self.loc)?;
        map.serialize_entry("message", &self.message())?;
        map.serialize_entry("input_value", &self.input_value.to_json())?;
        if let Some(context) = context {
            map.serialize_entry("context", &context)?;
        }
        map.end()
    }
}

/// Failure while validating input: every violation found in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    title: String,
    line_errors: Vec<LineError>,
}

impl ValidationError {
    pub fn new(title: impl Into<String>, line_errors: Vec<LineError>) -> Self {
        Self { title: title.into(), line_errors }
    }

    /// The name of the validator that produced this error.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The structured entries, in traversal order.
    pub fn errors(&self) -> &[LineError] {
        &self.line_errors
    }

    pub fn error_count(&self) -> usize {
        self.line_errors.len()
    }

    /// Consumes self and returns the inner entries.
    pub fn into_errors(self) -> Vec<LineError> {
        self.line_errors
    }

    /// The entries as a JSON array.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.line_errors).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.line_errors.len();
        let plural = if count == 1 { "" } else { "s" };
        write!(f, "{count} validation error{plural} for {}", self.title)?;
        for line in &self.line_errors {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
