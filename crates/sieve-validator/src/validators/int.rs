//! # Integer Validator
//!
//! Strict mode accepts only integers. Lax mode also accepts booleans,
//! floats without a fractional part, and text holding a base-10 integer
//! (surrounding whitespace allowed). Bounds are checked after coercion in
//! the order `multiple_of`, `le`, `lt`, `ge`, `gt`.

use serde::{Deserialize, Serialize};
use sieve_core::{ErrorType, LineError, SchemaDict, SchemaError, Value};

use super::{CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{is_strict, BuildContext, BuildValidator, SchemaDictExt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntValidator {
    strict: bool,
    multiple_of: Option<i64>,
    le: Option<i64>,
    lt: Option<i64>,
    ge: Option<i64>,
    gt: Option<i64>,
}

impl BuildValidator for IntValidator {
    const EXPECTED_TYPE: &'static str = "int";

    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        let config = ctx.config();
        let multiple_of = schema.get_as_i64("multiple_of")?;
        if matches!(multiple_of, Some(m) if m <= 0) {
            return Err(SchemaError::Value("'multiple_of' must be greater than zero".to_string()));
        }
        Ok(CombinedValidator::Int(Self {
            strict: is_strict(schema, config)?,
            multiple_of,
            le: schema.get_as_i64("le")?.or(config.int_le),
            lt: schema.get_as_i64("lt")?.or(config.int_lt),
            ge: schema.get_as_i64("ge")?.or(config.int_ge),
            gt: schema.get_as_i64("gt")?.or(config.int_gt),
        }))
    }
}

impl IntValidator {
    fn coerce(input: &Value, strict: bool) -> Result<i64, ErrorType> {
        match input {
            Value::Int(i) => Ok(*i),
            _ if strict => Err(ErrorType::IntType),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Float(f) => float_as_int(*f),
            Value::Str(s) => parse_int(s),
            Value::WideStr(units) => String::from_utf16(units)
                .map_err(|_| ErrorType::IntParsing)
                .and_then(|s| parse_int(&s)),
            _ => Err(ErrorType::IntType),
        }
    }

    fn check_bounds(&self, value: i64) -> Result<(), ErrorType> {
        if let Some(multiple_of) = self.multiple_of {
            if value % multiple_of != 0 {
                return Err(ErrorType::MultipleOf { multiple_of });
            }
        }
        if let Some(le) = self.le {
            if value > le {
                return Err(ErrorType::LessThanEqual { le });
            }
        }
        if let Some(lt) = self.lt {
            if value >= lt {
                return Err(ErrorType::LessThan { lt });
            }
        }
        if let Some(ge) = self.ge {
            if value < ge {
                return Err(ErrorType::GreaterThanEqual { ge });
            }
        }
        if let Some(gt) = self.gt {
            if value <= gt {
                return Err(ErrorType::GreaterThan { gt });
            }
        }
        Ok(())
    }
}

fn parse_int(text: &str) -> Result<i64, ErrorType> {
    text.trim().parse::<i64>().map_err(|_| ErrorType::IntParsing)
}

fn float_as_int(f: f64) -> Result<i64, ErrorType> {
    if !f.is_finite() {
        Err(ErrorType::IntParsing)
    } else if f.fract() != 0.0 {
        Err(ErrorType::IntFromFloat)
    } else if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        Err(ErrorType::IntParsing)
    } else {
        Ok(f as i64)
    }
}

impl Validator for IntValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        let strict = state.strict_or(self.strict);
        let value = Self::coerce(input, strict).map_err(|e| vec![LineError::new(e, input)])?;
        self.check_bounds(value).map_err(|e| vec![LineError::new(e, input)])?;
        Ok(Value::Int(value))
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}
