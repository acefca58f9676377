//! # String Validator
//!
//! Fixed five-stage pipeline; each stage runs only if the previous one
//! accepted the input:
//!
//! 1. **Admission**: strict mode accepts native text only. Lax mode also
//!    decodes binary input as UTF-8 (`str_unicode` on failure). Numbers,
//!    booleans and containers are never coerced (`str_type`).
//! 2. **Length**: `min_length` / `max_length`, counted in Unicode scalar
//!    values on the admitted text.
//! 3. **Pattern**: regex *search* on the admitted text.
//! 4. **Whitespace stripping**.
//! 5. **Case transform**: `to_upper` wins if both are set.
//!
//! Stages 2–5 need a well-formed view of the text. Wide text containing
//! unpaired surrogates is returned untouched when no constraint is
//! configured, and fails with `str_unicode` as soon as one is.

use std::borrow::Cow;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sieve_core::{ErrorType, LineError, SchemaDict, SchemaError, Value};

use super::{CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{is_strict, BuildContext, BuildValidator, SchemaDictExt};

/// A compiled regex that remembers its source text.
///
/// Serializes as the source and recompiles on deserialization.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`.
    ///
    /// # Errors
    ///
    /// Returns the regex engine's parse diagnostic.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self { source: source.to_string(), regex: Regex::new(source)? })
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Validates and transforms text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrValidator {
    strict: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Pattern>,
    strip_whitespace: bool,
    to_lower: bool,
    to_upper: bool,
}

impl BuildValidator for StrValidator {
    const EXPECTED_TYPE: &'static str = "str";

    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        let config = ctx.config();
        let pattern = match schema.get_as_str("pattern")? {
            Some(source) => Some(Pattern::new(&source).map_err(|e| SchemaError::Schema(e.to_string()))?),
            None => None,
        };
        Ok(CombinedValidator::Str(Self {
            strict: is_strict(schema, config)?,
            min_length: schema.get_as_usize("min_length")?.or(config.str_min_length),
            max_length: schema.get_as_usize("max_length")?.or(config.str_max_length),
            pattern,
            strip_whitespace: schema
                .get_as_bool("strip_whitespace")?
                .or(config.str_strip_whitespace)
                .unwrap_or(false),
            to_lower: schema.get_as_bool("to_lower")?.or(config.str_to_lower).unwrap_or(false),
            to_upper: schema.get_as_bool("to_upper")?.or(config.str_to_upper).unwrap_or(false),
        }))
    }
}

/// Text admitted by stage 1, not yet required to be well-formed.
enum Admitted<'a> {
    Text(Cow<'a, str>),
    Wide(&'a [u16]),
}

impl StrValidator {
    fn has_constraints(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.pattern.is_some()
            || self.strip_whitespace
            || self.to_lower
            || self.to_upper
    }

    fn admit<'a>(input: &'a Value, strict: bool) -> Result<Admitted<'a>, ErrorType> {
        match input {
            Value::Str(s) => Ok(Admitted::Text(Cow::Borrowed(s.as_str()))),
            Value::WideStr(units) => Ok(Admitted::Wide(units)),
            Value::Bytes(bytes) | Value::ByteArray(bytes) if !strict => std::str::from_utf8(bytes)
                .map(|s| Admitted::Text(Cow::Borrowed(s)))
                .map_err(|_| ErrorType::StrUnicode),
            _ => Err(ErrorType::StrType),
        }
    }

    fn constrain(&self, text: &str) -> Result<String, ErrorType> {
        if self.min_length.is_some() || self.max_length.is_some() {
            let length = text.chars().count();
            if let Some(min_length) = self.min_length {
                if length < min_length {
                    return Err(ErrorType::TooShort { min_length });
                }
            }
            if let Some(max_length) = self.max_length {
                if length > max_length {
                    return Err(ErrorType::TooLong { max_length });
                }
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                return Err(ErrorType::StrPatternMismatch { pattern: pattern.as_str().to_string() });
            }
        }

        let text = if self.strip_whitespace { text.trim() } else { text };

        Ok(if self.to_upper {
            text.to_uppercase()
        } else if self.to_lower {
            text.to_lowercase()
        } else {
            text.to_string()
        })
    }
}

impl Validator for StrValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        let strict = state.strict_or(self.strict);
        let admitted = Self::admit(input, strict).map_err(|e| vec![LineError::new(e, input)])?;

        if !self.has_constraints() {
            return Ok(match admitted {
                Admitted::Text(text) => Value::Str(text.into_owned()),
                Admitted::Wide(units) => Value::WideStr(units.to_vec()),
            });
        }

        let text = match admitted {
            Admitted::Text(text) => text,
            Admitted::Wide(units) => Cow::Owned(
                String::from_utf16(units).map_err(|_| vec![LineError::new(ErrorType::StrUnicode, input)])?,
            ),
        };
        self.constrain(&text)
            .map(Value::Str)
            .map_err(|e| vec![LineError::new(e, input)])
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}
