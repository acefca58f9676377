//! # Record Validator
//!
//! Validates a string-keyed mapping field by field. Every field is checked
//! and every failure collected before returning; a field's own errors are
//! flattened into the report with the input key it was found under
//! prefixed to their locations.
//!
//! Field descriptions have the shape
//! `{"schema": <description>, "required": bool, "default": <value>,
//! "alias": str, "aliases": [[str | int, ...], ...]}`; only `schema` is
//! mandatory and `required` defaults to `true`. See [`LookupKey`] for how
//! aliases resolve. A default must hold only finite floats and nest at
//! most [`MAX_DEFAULT_DEPTH`] containers deep.
//!
//! Input keys no field consumed follow `extra_behavior`:
//! `ignore` (drop, default), `forbid` (`extra_forbidden` per key) or
//! `allow` (copy through unchanged after the declared fields).

use serde::{Deserialize, Serialize};
use sieve_core::{ErrorType, LineError, Schema, SchemaDict, SchemaError, Value};

use super::{CombinedValidator, ValResult, ValidationState, Validator};
use crate::build::{BuildContext, BuildValidator, SchemaDictExt, MAX_DEFAULT_DEPTH};
use crate::lookup_key::LookupKey;

/// What to do with input keys that no field declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraBehavior {
    #[default]
    Ignore,
    Forbid,
    Allow,
}

impl ExtraBehavior {
    fn parse(value: Option<String>) -> Result<Self, SchemaError> {
        match value.as_deref() {
            None | Some("ignore") => Ok(Self::Ignore),
            Some("forbid") => Ok(Self::Forbid),
            Some("allow") => Ok(Self::Allow),
            Some(other) => Err(SchemaError::Value(format!(
                "Invalid extra_behavior: \"{other}\", expected one of \"ignore\", \"forbid\", \"allow\""
            ))),
        }
    }
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    name: String,
    lookup_key: LookupKey,
    required: bool,
    default: Option<Value>,
    validator: CombinedValidator,
}

impl RecordField {
    fn build(name: &str, field: &Schema, by_name: bool, ctx: &mut BuildContext<'_>) -> Result<Self, SchemaError> {
        let Schema::Dict(field) = field else {
            return Err(SchemaError::Type(format!(
                "'{}' object cannot be converted to 'dict'",
                field.type_name()
            )));
        };
        let lookup_key = LookupKey::build(field, name, by_name)?;
        let default = match field.get("default") {
            Some(default) => Some(checked_default(default.to_value().ok_or(SchemaError::Cycle)?)?),
            None => None,
        };
        let validator = ctx.build(&field.get_required("schema")?)?;
        Ok(Self {
            name: name.to_string(),
            lookup_key,
            required: field.get_as_bool("required")?.unwrap_or(true),
            default,
            validator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookup_key(&self) -> &LookupKey {
        &self.lookup_key
    }
}

fn checked_default(default: Value) -> Result<Value, SchemaError> {
    let depth = container_depth(&default)?;
    if depth > MAX_DEFAULT_DEPTH {
        return Err(SchemaError::Value(format!(
            "default nests {depth} containers deep, the maximum is {MAX_DEFAULT_DEPTH}"
        )));
    }
    Ok(default)
}

/// Container nesting of `value`; byte and UTF-16 payloads count as one.
fn container_depth(value: &Value) -> Result<usize, SchemaError> {
    match value {
        Value::Float(f) if !f.is_finite() => {
            Err(SchemaError::Value(format!("default must hold finite floats only, got {}", value.repr())))
        }
        Value::List(items) => Ok(deepest(items.iter())? + 1),
        Value::Dict(pairs) => Ok(deepest(pairs.iter().map(|(_, v)| v))? + 1),
        Value::WideStr(_) | Value::Bytes(_) | Value::ByteArray(_) => Ok(1),
        _ => Ok(0),
    }
}

fn deepest<'a>(mut children: impl Iterator<Item = &'a Value>) -> Result<usize, SchemaError> {
    children.try_fold(0, |max, child| container_depth(child).map(|depth| max.max(depth)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordValidator {
    fields: Vec<RecordField>,
    extra_behavior: ExtraBehavior,
}

impl RecordValidator {
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }
}

impl BuildValidator for RecordValidator {
    const EXPECTED_TYPE: &'static str = "record";

    fn build(schema: &SchemaDict, ctx: &mut BuildContext<'_>) -> Result<CombinedValidator, SchemaError> {
        let extra_behavior = ExtraBehavior::parse(schema.get_as_str("extra_behavior")?)?;
        let by_name = schema.get_as_bool("populate_by_name")?.unwrap_or(false);
        let declared = schema
            .get_as_dict("fields")?
            .ok_or_else(|| SchemaError::Schema("\"fields\" is required".to_string()))?;

        let fields = declared
            .entries()
            .iter()
            .map(|(name, field)| {
                RecordField::build(name, field, by_name, ctx).map_err(|e| SchemaError::field(name.as_str(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(fields = fields.len(), "record validator compiled");
        Ok(CombinedValidator::Record(Self { fields, extra_behavior }))
    }
}

impl Validator for RecordValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        let Value::Dict(pairs) = input else {
            return Err(vec![LineError::new(ErrorType::DictType, input)]);
        };

        let mut output: Vec<(String, Value)> = Vec::with_capacity(self.fields.len());
        let mut errors: Vec<LineError> = Vec::new();
        let mut used_keys: Vec<&str> = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            match field.lookup_key.get(input) {
                Some((used_key, value)) => {
                    used_keys.push(used_key);
                    match field.validator.validate(value, state) {
                        Ok(value) => output.push((field.name.clone(), value)),
                        Err(field_errors) => {
                            errors.extend(field_errors.into_iter().map(|e| e.with_outer_location(used_key)))
                        }
                    }
                }
                None => {
                    if let Some(default) = &field.default {
                        output.push((field.name.clone(), default.clone()));
                    } else if field.required {
                        errors.push(
                            LineError::new(ErrorType::Missing, input)
                                .with_outer_location(field.lookup_key.primary_key().unwrap_or(&field.name)),
                        );
                    }
                }
            }
        }

        if self.extra_behavior != ExtraBehavior::Ignore {
            for (key, value) in pairs {
                if used_keys.contains(&key.as_str()) {
                    continue;
                }
                match self.extra_behavior {
                    ExtraBehavior::Forbid => errors
                        .push(LineError::new(ErrorType::ExtraForbidden, value).with_outer_location(key.as_str())),
                    ExtraBehavior::Allow => output.push((key.clone(), value.clone())),
                    ExtraBehavior::Ignore => {}
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Dict(output))
        } else {
            Err(errors)
        }
    }

    fn kind_label(&self) -> &'static str {
        Self::EXPECTED_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_core::{Config, LocItem, SchemaList};

    fn build(schema: serde_json::Value) -> Result<CombinedValidator, SchemaError> {
        let config = Config::default();
        BuildContext::new(&config).build(&Schema::from(schema))
    }

    fn input(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_fields_validated_in_declaration_order() {
        let fields = SchemaDict::new()
            .with("name", SchemaDict::new().with("schema", "str"))
            .with("age", SchemaDict::new().with("schema", "int"));
        let schema = SchemaDict::new().with("type", "record").with("fields", fields);
        let config = Config::default();
        let v = BuildContext::new(&config).build(&Schema::Dict(schema)).unwrap();
        let out = v.validate(&input(json!({"age": "42", "name": "x"})), &ValidationState::default());
        assert_eq!(out, Ok(Value::dict([("name", Value::from("x")), ("age", Value::Int(42))])));
    }

    #[test]
    fn test_all_field_errors_collected() {
        let v = build(json!({
            "type": "record",
            "fields": {"a": {"schema": "int"}, "b": {"schema": "int"}, "c": {"schema": "str"}},
        }))
        .unwrap();
        let errors = v
            .validate(&input(json!({"a": "x", "c": 1})), &ValidationState::default())
            .unwrap_err();
        let summary: Vec<(Vec<LocItem>, &str)> = errors.iter().map(|e| (e.loc.clone(), e.kind())).collect();
        assert_eq!(
            summary,
            vec![
                (vec![LocItem::from("a")], "int_parsing"),
                (vec![LocItem::from("b")], "missing"),
                (vec![LocItem::from("c")], "str_type"),
            ]
        );
    }

    #[test]
    fn test_nested_location() {
        let v = build(json!({
            "type": "record",
            "fields": {"items": {"schema": {
                "type": "list",
                "items_schema": {"type": "record", "fields": {"n": {"schema": "int"}}},
            }}},
        }))
        .unwrap();
        let errors = v
            .validate(&input(json!({"items": [{"n": 1}, {"n": "bad"}]})), &ValidationState::default())
            .unwrap_err();
        assert_eq!(errors[0].loc, vec![LocItem::from("items"), LocItem::Index(1), LocItem::from("n")]);
    }

    #[test]
    fn test_optional_and_default() {
        let v = build(json!({
            "type": "record",
            "fields": {
                "a": {"schema": "int", "required": false},
                "b": {"schema": "int", "default": 7},
            },
        }))
        .unwrap();
        let out = v.validate(&input(json!({})), &ValidationState::default());
        assert_eq!(out, Ok(Value::dict([("b", Value::Int(7))])));
    }

    #[test]
    fn test_extra_forbid() {
        let v = build(json!({"type": "record", "fields": {}, "extra_behavior": "forbid"})).unwrap();
        let errors = v.validate(&input(json!({"x": 1})), &ValidationState::default()).unwrap_err();
        assert_eq!(errors[0].kind(), "extra_forbidden");
        assert_eq!(errors[0].loc, vec![LocItem::from("x")]);
        assert_eq!(errors[0].input_value, Value::Int(1));
    }

    #[test]
    fn test_extra_allow_and_ignore() {
        let allow = build(json!({"type": "record", "fields": {}, "extra_behavior": "allow"})).unwrap();
        let ignore = build(json!({"type": "record", "fields": {}})).unwrap();
        let data = input(json!({"x": 1}));
        assert_eq!(allow.validate(&data, &ValidationState::default()), Ok(data.clone()));
        assert_eq!(ignore.validate(&data, &ValidationState::default()), Ok(Value::Dict(vec![])));
    }

    #[test]
    fn test_bad_extra_behavior() {
        let err = build(json!({"type": "record", "fields": {}, "extra_behavior": "drop"})).unwrap_err();
        assert_eq!(err.root_cause().class_name(), "ValueError");
    }

    #[test]
    fn test_field_must_be_dict() {
        let err = build(json!({"type": "record", "fields": {"a": "int"}})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error building \"record\" validator:\n  SchemaError: Field \"a\":\n  \
             TypeError: 'str' object cannot be converted to 'dict'"
        );
    }

    #[test]
    fn test_non_finite_default_rejected() {
        for bad in [Schema::Float(f64::INFINITY), Schema::Float(f64::NAN)] {
            let fields = SchemaDict::new().with("x", SchemaDict::new().with("schema", "any").with("default", bad));
            let schema = SchemaDict::new().with("type", "record").with("fields", fields);
            let config = Config::default();
            let err = BuildContext::new(&config).build(&Schema::Dict(schema)).unwrap_err();
            assert_eq!(err.root_cause().class_name(), "ValueError");
            assert!(err.to_string().starts_with("Error building \"record\" validator:\n  SchemaError: Field \"x\":"));
        }

        let nested = SchemaList::new();
        nested.push(Schema::Float(f64::NEG_INFINITY));
        let fields = SchemaDict::new().with("x", SchemaDict::new().with("schema", "any").with("default", nested));
        let schema = SchemaDict::new().with("type", "record").with("fields", fields);
        let config = Config::default();
        let err = BuildContext::new(&config).build(&Schema::Dict(schema)).unwrap_err();
        assert_eq!(
            err.root_cause(),
            &SchemaError::Value("default must hold finite floats only, got -inf".to_string())
        );
    }

    #[test]
    fn test_finite_float_default_accepted() {
        let v = build(json!({"type": "record", "fields": {"x": {"schema": "any", "default": {"k": [1.5]}}}})).unwrap();
        let out = v.validate(&input(json!({})), &ValidationState::default());
        assert_eq!(out, Ok(input(json!({"x": {"k": [1.5]}}))));
    }

    #[test]
    fn test_default_nesting_ceiling() {
        let nested = |depth: usize| (0..depth).fold(json!(1), |inner, _| json!([inner]));
        let schema = |default: serde_json::Value| {
            json!({"type": "record", "fields": {"x": {"schema": "any", "default": default}}})
        };

        assert!(build(schema(nested(MAX_DEFAULT_DEPTH))).is_ok());
        let err = build(schema(nested(MAX_DEFAULT_DEPTH + 1))).unwrap_err();
        assert_eq!(err.root_cause().class_name(), "ValueError");
    }

    #[test]
    fn test_alias_lookup() {
        let v = build(json!({"type": "record", "fields": {"user_id": {"schema": "int", "alias": "userId"}}})).unwrap();
        let state = ValidationState::default();
        assert_eq!(
            v.validate(&input(json!({"userId": "7"})), &state),
            Ok(Value::dict([("user_id", Value::Int(7))]))
        );

        let errors = v.validate(&input(json!({"userId": "x"})), &state).unwrap_err();
        assert_eq!(errors[0].loc, vec![LocItem::from("userId")]);

        let errors = v.validate(&input(json!({"user_id": 7})), &state).unwrap_err();
        assert_eq!(errors[0].kind(), "missing");
        assert_eq!(errors[0].loc, vec![LocItem::from("userId")]);
    }

    #[test]
    fn test_populate_by_name() {
        let v = build(json!({
            "type": "record",
            "populate_by_name": true,
            "fields": {"user_id": {"schema": "int", "alias": "userId"}},
        }))
        .unwrap();
        let state = ValidationState::default();
        assert_eq!(
            v.validate(&input(json!({"user_id": 1})), &state),
            Ok(Value::dict([("user_id", Value::Int(1))]))
        );
        let errors = v.validate(&input(json!({"user_id": "x"})), &state).unwrap_err();
        assert_eq!(errors[0].loc, vec![LocItem::from("user_id")]);
    }

    #[test]
    fn test_alias_path_location_and_extras() {
        let v = build(json!({
            "type": "record",
            "extra_behavior": "forbid",
            "fields": {"city": {"schema": "str", "aliases": [["address", "city"], ["town"]]}},
        }))
        .unwrap();
        let state = ValidationState::default();

        let out = v.validate(&input(json!({"address": {"city": "Oslo", "zip": "0150"}})), &state);
        assert_eq!(out, Ok(Value::dict([("city", Value::from("Oslo"))])));

        let errors = v.validate(&input(json!({"address": {"city": 5}})), &state).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].loc, vec![LocItem::from("address")]);

        let errors = v.validate(&input(json!({"town": "Bergen", "city": "x"})), &state).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), "extra_forbidden");
        assert_eq!(errors[0].loc, vec![LocItem::from("city")]);
    }

    #[test]
    fn test_alias_build_errors_chained() {
        let err = build(json!({"type": "record", "fields": {"a": {"schema": "int", "alias": "b", "aliases": [["c"]]}}}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error building \"record\" validator:\n  SchemaError: Field \"a\":\n  \
             SchemaError: 'alias' and 'aliases' cannot be used together"
        );

        let err = build(json!({"type": "record", "fields": {"a": {"schema": "int", "aliases": []}}})).unwrap_err();
        assert_eq!(
            err.root_cause(),
            &SchemaError::Schema("aliases must have at least one element".to_string())
        );

        let err = build(json!({"type": "record", "fields": {"a": {"schema": "int", "aliases": [[]]}}})).unwrap_err();
        assert_eq!(
            err.root_cause(),
            &SchemaError::Schema("Each alias path must have at least one element".to_string())
        );
    }

    #[test]
    fn test_not_a_dict() {
        let v = build(json!({"type": "record", "fields": {}})).unwrap();
        let errors = v.validate(&Value::List(vec![]), &ValidationState::default()).unwrap_err();
        assert_eq!(errors[0].kind(), "dict_type");
    }
}
