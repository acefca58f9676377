//! # Schema Compiler
//!
//! Turns an untyped [`Schema`] description into a [`CombinedValidator`]
//! tree. Each kind-specific builder validates its own constraint fields
//! eagerly and, for composite kinds, recurses through
//! [`BuildContext::build`].
//!
//! ## Cycle Detection
//!
//! The context keeps the identities of the description records on the
//! current recursion path. Meeting one of them again means the record is
//! its own descendant, and compilation fails with [`SchemaError::Cycle`].
//! Structurally identical but distinct records are never confused with a
//! cycle; only the depth ceiling [`MAX_SCHEMA_DEPTH`] bounds them.
//!
//! ## Error Chaining
//!
//! A builder failure is wrapped as `Error building "<kind>" validator`;
//! composite builders wrap child failures with the field name or index
//! first, so the chain mirrors the description's nesting exactly.

use sieve_core::{Config, Schema, SchemaDict, SchemaError, SchemaList};

use crate::validators::{
    AnyValidator, BoolValidator, CombinedValidator, IntValidator, ListValidator, NullableValidator,
    RecordValidator, StrValidator, UnionValidator,
};

/// Deepest description nesting the compiler will follow.
///
/// A compiled tree at this depth, including record defaults within
/// [`MAX_DEFAULT_DEPTH`], stays under `serde_yaml`'s 128 nesting levels,
/// so every [`Protocol`](crate::Protocol) can restore it.
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// Deepest container nesting allowed in a record field default.
pub const MAX_DEFAULT_DEPTH: usize = 16;

/// Implemented by every validator kind that can be compiled from a
/// description record.
pub trait BuildValidator: Sized {
    /// The `type` discriminant this kind is registered under.
    const EXPECTED_TYPE: &'static str;

    /// Compile `schema`, recursing through `ctx` for child descriptions.
    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError>;
}

/// State threaded through one compilation.
#[derive(Debug)]
pub struct BuildContext<'a> {
    config: &'a Config,
    path: Vec<usize>,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, path: Vec::new() }
    }

    /// Ambient configuration for this compilation.
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Compile one description, which may be a bare type name or a record.
    pub fn build(&mut self, schema: &Schema) -> Result<CombinedValidator, SchemaError> {
        match schema {
            Schema::Str(type_name) => {
                let dict = SchemaDict::new().with("type", type_name.as_str());
                self.build_dict(&dict)
            }
            Schema::Dict(dict) => self.build_dict(dict),
            other => Err(SchemaError::Type(format!(
                "'{}' object cannot be converted to 'str'",
                other.type_name()
            ))),
        }
    }

    fn build_dict(&mut self, dict: &SchemaDict) -> Result<CombinedValidator, SchemaError> {
        let identity = dict.identity();
        if self.path.contains(&identity) {
            tracing::warn!(depth = self.path.len(), "cyclic schema description rejected");
            return Err(SchemaError::Cycle);
        }
        if self.path.len() >= MAX_SCHEMA_DEPTH {
            tracing::warn!(max_depth = MAX_SCHEMA_DEPTH, "schema description nesting too deep");
            return Err(SchemaError::DepthExceeded(MAX_SCHEMA_DEPTH));
        }

        self.path.push(identity);
        let result = self.dispatch(dict);
        self.path.pop();
        result
    }

    fn dispatch(&mut self, dict: &SchemaDict) -> Result<CombinedValidator, SchemaError> {
        let type_name = dict.get_as_str("type")?.ok_or_else(|| SchemaError::Schema("\"type\" is required".to_string()))?;

        let built = match type_name.as_str() {
            "str" => StrValidator::build(dict, self),
            "int" => IntValidator::build(dict, self),
            "bool" => BoolValidator::build(dict, self),
            "any" => AnyValidator::build(dict, self),
            "nullable" => NullableValidator::build(dict, self),
            "union" => UnionValidator::build(dict, self),
            "list" => ListValidator::build(dict, self),
            "record" | "typed-dict" => RecordValidator::build(dict, self),
            _ => return Err(SchemaError::UnknownType(type_name)),
        };
        built.map_err(|cause| SchemaError::building(type_name, cause))
    }
}

/// Typed accessors for description records.
///
/// Each returns `Ok(None)` when the key is absent and a `TypeError`-class
/// [`SchemaError`] naming the offending value's type when it is present
/// but of the wrong primitive type.
pub trait SchemaDictExt {
    fn get_as_str(&self, key: &str) -> Result<Option<String>, SchemaError>;
    fn get_as_bool(&self, key: &str) -> Result<Option<bool>, SchemaError>;
    fn get_as_i64(&self, key: &str) -> Result<Option<i64>, SchemaError>;
    fn get_as_usize(&self, key: &str) -> Result<Option<usize>, SchemaError>;
    fn get_as_dict(&self, key: &str) -> Result<Option<SchemaDict>, SchemaError>;
    fn get_as_list(&self, key: &str) -> Result<Option<SchemaList>, SchemaError>;

    /// The raw description under `key`, failing if it is absent.
    fn get_required(&self, key: &str) -> Result<Schema, SchemaError>;
}

fn conversion_error(value: &Schema, target: &str) -> SchemaError {
    SchemaError::Type(format!("'{}' object cannot be converted to '{target}'", value.type_name()))
}

impl SchemaDictExt for SchemaDict {
    fn get_as_str(&self, key: &str) -> Result<Option<String>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Schema::Str(s)) => Ok(Some(s)),
            Some(other) => Err(conversion_error(&other, "str")),
        }
    }

    fn get_as_bool(&self, key: &str) -> Result<Option<bool>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Schema::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(conversion_error(&other, "bool")),
        }
    }

    fn get_as_i64(&self, key: &str) -> Result<Option<i64>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Schema::Int(i)) => Ok(Some(i)),
            Some(other) => Err(SchemaError::Type(format!(
                "'{}' object cannot be interpreted as an integer",
                other.type_name()
            ))),
        }
    }

    fn get_as_usize(&self, key: &str) -> Result<Option<usize>, SchemaError> {
        match self.get_as_i64(key)? {
            None => Ok(None),
            Some(i) => usize::try_from(i)
                .map(Some)
                .map_err(|_| SchemaError::Value(format!("'{key}' must not be negative, got {i}"))),
        }
    }

    fn get_as_dict(&self, key: &str) -> Result<Option<SchemaDict>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Schema::Dict(d)) => Ok(Some(d)),
            Some(other) => Err(conversion_error(&other, "dict")),
        }
    }

    fn get_as_list(&self, key: &str) -> Result<Option<SchemaList>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Schema::List(l)) => Ok(Some(l)),
            Some(other) => Err(conversion_error(&other, "list")),
        }
    }

    fn get_required(&self, key: &str) -> Result<Schema, SchemaError> {
        self.get(key).ok_or_else(|| SchemaError::Schema(format!("\"{key}\" is required")))
    }
}

/// Resolve a node's strict flag: node field, then config, then lax.
pub fn is_strict(schema: &SchemaDict, config: &Config) -> Result<bool, SchemaError> {
    Ok(schema.get_as_bool("strict")?.or(config.strict).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(schema: serde_json::Value) -> Result<CombinedValidator, SchemaError> {
        let config = Config::default();
        BuildContext::new(&config).build(&Schema::from(schema))
    }

    #[test]
    fn test_shorthand_type_name() {
        let v = build(json!("int")).unwrap();
        assert!(matches!(v, CombinedValidator::Int(_)));
    }

    #[test]
    fn test_unknown_type_not_wrapped() {
        let err = build(json!({"type": "foobar"})).unwrap_err();
        assert_eq!(err, SchemaError::UnknownType("foobar".to_string()));
    }

    #[test]
    fn test_missing_type() {
        let err = build(json!({"min_length": 1})).unwrap_err();
        assert_eq!(err.to_string(), "\"type\" is required");
    }

    #[test]
    fn test_type_must_be_string() {
        let err = build(json!({"type": 1})).unwrap_err();
        assert_eq!(err.to_string(), "'int' object cannot be converted to 'str'");
    }

    #[test]
    fn test_typed_dict_alias() {
        let v = build(json!({"type": "typed-dict", "fields": {}})).unwrap();
        assert!(matches!(v, CombinedValidator::Record(_)));
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let schema = SchemaDict::new().with("type", "nullable");
        schema.insert("schema", schema.clone());
        let config = Config::default();
        let err = BuildContext::new(&config).build(&Schema::Dict(schema)).unwrap_err();
        assert_eq!(err.root_cause(), &SchemaError::Cycle);
    }

    #[test]
    fn test_shared_sibling_is_not_cycle() {
        // The same record used twice side by side is not its own descendant.
        let int = SchemaDict::new().with("type", "int");
        let choices = SchemaList::new();
        choices.push(int.clone());
        choices.push(int);
        let union = SchemaDict::new().with("type", "union").with("choices", choices);
        let config = Config::default();
        assert!(BuildContext::new(&config).build(&Schema::Dict(union)).is_ok());
    }

    #[test]
    fn test_depth_ceiling() {
        let mut schema = json!("int");
        for _ in 0..(MAX_SCHEMA_DEPTH + 1) {
            schema = json!({"type": "nullable", "schema": schema});
        }
        let err = build(schema).unwrap_err();
        assert_eq!(err.root_cause(), &SchemaError::DepthExceeded(MAX_SCHEMA_DEPTH));
    }

    #[test]
    fn test_depth_within_ceiling() {
        let mut schema = json!("int");
        for _ in 0..(MAX_SCHEMA_DEPTH - 1) {
            schema = json!({"type": "nullable", "schema": schema});
        }
        assert!(build(schema).is_ok());
    }

    #[test]
    fn test_get_as_usize_negative() {
        let d = SchemaDict::new().with("min_length", -1i64);
        let err = d.get_as_usize("min_length").unwrap_err();
        assert_eq!(err.class_name(), "ValueError");
    }

    #[test]
    fn test_is_strict_precedence() {
        let config = Config::default().with_strict(true);
        let lax_node = SchemaDict::new().with("strict", false);
        assert!(!is_strict(&lax_node, &config).unwrap());
        assert!(is_strict(&SchemaDict::new(), &config).unwrap());
        assert!(!is_strict(&SchemaDict::new(), &Config::default()).unwrap());
    }
}
