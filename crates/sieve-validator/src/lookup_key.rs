//! # Field Lookup Keys
//!
//! How a record field finds its value in an input mapping. A field is found
//! under its own name by default. A single `alias` replaces the name. An
//! `aliases` list gives one or more paths, each walking nested mappings by
//! key and sequences by index; the first path that resolves wins.
//!
//! When the record sets `populate_by_name`, the field name is tried after
//! the aliases.
//!
//! A successful lookup also reports the top-level input key it used. That
//! key prefixes the locations of the field's errors and marks the key as
//! consumed for `extra_behavior`.

use std::fmt;

use serde::{Deserialize, Serialize};
use sieve_core::{Schema, SchemaDict, SchemaError, Value};

use crate::build::SchemaDictExt;

/// One step of an alias path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathItem {
    /// Key into a mapping.
    Key(String),
    /// Index into a sequence.
    Index(usize),
}

impl PathItem {
    fn build(position: usize, item: &Schema) -> Result<Self, SchemaError> {
        match item {
            Schema::Str(key) => Ok(Self::Key(key.clone())),
            Schema::Int(_) if position == 0 => Err(SchemaError::Type(
                "The first item in an alias path must be a string".to_string(),
            )),
            Schema::Int(index) => usize::try_from(*index)
                .map(Self::Index)
                .map_err(|_| SchemaError::Type("Alias path items must be a string or int".to_string())),
            _ => Err(SchemaError::Type("Alias path items must be a string or int".to_string())),
        }
    }

    fn get<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match (self, value) {
            (Self::Key(key), Value::Dict(_)) => value.get(key),
            (Self::Index(index), Value::List(items)) => items.get(*index),
            _ => None,
        }
    }
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A non-empty path whose first item is a key.
pub type LookupPath = Vec<PathItem>;

/// Where a record field's value is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupKey {
    /// One key.
    Simple(String),
    /// The first key, falling back to the second.
    Choice(String, String),
    /// Each path in order until one resolves.
    PathChoices(Vec<LookupPath>),
}

impl LookupKey {
    /// Resolve the lookup for field `name` from its description's `alias`
    /// or `aliases`. With `by_name`, the field name stays reachable as a
    /// fallback after any alias.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError`-class error when both keys are present or
    /// `aliases` or one of its paths is empty, and a `TypeError`-class error
    /// for a malformed path.
    pub fn build(field: &SchemaDict, name: &str, by_name: bool) -> Result<Self, SchemaError> {
        if let Some(alias) = field.get_as_str("alias")? {
            if field.contains_key("aliases") {
                return Err(SchemaError::Schema("'alias' and 'aliases' cannot be used together".to_string()));
            }
            return Ok(if by_name && alias != name {
                Self::Choice(alias, name.to_string())
            } else {
                Self::Simple(alias)
            });
        }

        let Some(aliases) = field.get_as_list("aliases")? else {
            return Ok(Self::Simple(name.to_string()));
        };
        let mut paths = aliases.items().iter().map(build_path).collect::<Result<Vec<_>, _>>()?;
        if paths.is_empty() {
            return Err(SchemaError::Schema("aliases must have at least one element".to_string()));
        }
        if by_name {
            paths.push(vec![PathItem::Key(name.to_string())]);
        }
        Ok(Self::PathChoices(paths))
    }

    /// The key a missing field is reported under.
    pub fn primary_key(&self) -> Option<&str> {
        match self {
            Self::Simple(key) | Self::Choice(key, _) => Some(key.as_str()),
            Self::PathChoices(paths) => match paths.first()?.first()? {
                PathItem::Key(key) => Some(key.as_str()),
                PathItem::Index(_) => None,
            },
        }
    }

    /// Find this key's value in `input`, together with the top-level key
    /// that led to it.
    pub fn get<'k, 'v>(&'k self, input: &'v Value) -> Option<(&'k str, &'v Value)> {
        match self {
            Self::Simple(key) => input.get(key).map(|value| (key.as_str(), value)),
            Self::Choice(first, second) => input
                .get(first)
                .map(|value| (first.as_str(), value))
                .or_else(|| input.get(second).map(|value| (second.as_str(), value))),
            Self::PathChoices(paths) => paths.iter().find_map(|path| {
                let (PathItem::Key(key), rest) = path.split_first()? else {
                    return None;
                };
                let value = rest.iter().try_fold(input.get(key)?, |value, item| item.get(value))?;
                Some((key.as_str(), value))
            }),
        }
    }
}

fn build_path(path: &Schema) -> Result<LookupPath, SchemaError> {
    let Schema::List(items) = path else {
        return Err(SchemaError::Type(format!(
            "'{}' object cannot be converted to 'list'",
            path.type_name()
        )));
    };
    let path = items
        .items()
        .iter()
        .enumerate()
        .map(|(position, item)| PathItem::build(position, item))
        .collect::<Result<LookupPath, _>>()?;
    if path.is_empty() {
        return Err(SchemaError::Schema("Each alias path must have at least one element".to_string()));
    }
    Ok(path)
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(key) => write!(f, "{key}"),
            Self::Choice(first, second) => write!(f, "{first} | {second}"),
            Self::PathChoices(paths) => {
                let rendered: Vec<String> = paths
                    .iter()
                    .map(|path| path.iter().map(ToString::to_string).collect::<Vec<_>>().join("."))
                    .collect();
                write!(f, "{}", rendered.join(" | "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(json: serde_json::Value) -> SchemaDict {
        match Schema::from(json) {
            Schema::Dict(dict) => dict,
            other => panic!("expected a dict, got {other:?}"),
        }
    }

    fn build(json: serde_json::Value) -> Result<LookupKey, SchemaError> {
        LookupKey::build(&field(json), "name", false)
    }

    #[test]
    fn test_no_alias_uses_field_name() {
        assert_eq!(build(json!({"schema": "int"})).unwrap(), LookupKey::Simple("name".to_string()));
    }

    #[test]
    fn test_single_alias() {
        let key = build(json!({"alias": "Name"})).unwrap();
        assert_eq!(key, LookupKey::Simple("Name".to_string()));
        let by_name = LookupKey::build(&field(json!({"alias": "Name"})), "name", true).unwrap();
        assert_eq!(by_name.to_string(), "Name | name");
    }

    #[test]
    fn test_alias_and_aliases_together() {
        let err = build(json!({"alias": "a", "aliases": [["b"]]})).unwrap_err();
        assert_eq!(err, SchemaError::Schema("'alias' and 'aliases' cannot be used together".to_string()));
    }

    #[test]
    fn test_empty_aliases() {
        let err = build(json!({"aliases": []})).unwrap_err();
        assert_eq!(err.to_string(), "aliases must have at least one element");
        assert_eq!(err.class_name(), "SchemaError");
    }

    #[test]
    fn test_empty_alias_path() {
        let err = build(json!({"aliases": [["a"], []]})).unwrap_err();
        assert_eq!(err.to_string(), "Each alias path must have at least one element");
    }

    #[test]
    fn test_alias_path_must_be_list() {
        let err = build(json!({"aliases": ["a"]})).unwrap_err();
        assert_eq!(err.to_string(), "'str' object cannot be converted to 'list'");
    }

    #[test]
    fn test_alias_path_first_item_is_key() {
        let err = build(json!({"aliases": [[0, "a"]]})).unwrap_err();
        assert_eq!(err.to_string(), "The first item in an alias path must be a string");
        assert_eq!(err.class_name(), "TypeError");
    }

    #[test]
    fn test_alias_path_item_types() {
        for bad in [json!(["a", 1.5]), json!(["a", -1]), json!(["a", null])] {
            let err = build(json!({"aliases": [bad]})).unwrap_err();
            assert_eq!(err.to_string(), "Alias path items must be a string or int");
        }
    }

    #[test]
    fn test_path_lookup() {
        let key = build(json!({"aliases": [["a", "b", 1], ["c"]]})).unwrap();
        assert_eq!(key.to_string(), "a.b.1 | c");

        let nested = Value::from(json!({"a": {"b": [10, 20]}, "c": 3}));
        assert_eq!(key.get(&nested), Some(("a", &Value::Int(20))));

        let short = Value::from(json!({"a": {"b": [10]}, "c": 3}));
        assert_eq!(key.get(&short), Some(("c", &Value::Int(3))));

        assert_eq!(key.get(&Value::from(json!({"a": "b"}))), None);
    }

    #[test]
    fn test_primary_key() {
        assert_eq!(build(json!({})).unwrap().primary_key(), Some("name"));
        assert_eq!(build(json!({"alias": "N"})).unwrap().primary_key(), Some("N"));
        assert_eq!(build(json!({"aliases": [["p", 0], ["q"]]})).unwrap().primary_key(), Some("p"));
    }

    #[test]
    fn test_index_does_not_apply_to_mappings() {
        let key = build(json!({"aliases": [["a", 0]]})).unwrap();
        assert_eq!(key.get(&Value::from(json!({"a": {"0": 1}}))), None);
        assert_eq!(key.get(&Value::from(json!({"a": [1]}))), Some(("a", &Value::Int(1))));
    }

    #[test]
    fn test_choice_prefers_alias() {
        let key = LookupKey::build(&field(json!({"alias": "Name"})), "name", true).unwrap();
        let both = Value::from(json!({"name": 1, "Name": 2}));
        assert_eq!(key.get(&both), Some(("Name", &Value::Int(2))));
        let name_only = Value::from(json!({"name": 1}));
        assert_eq!(key.get(&name_only), Some(("name", &Value::Int(1))));
    }

    #[test]
    fn test_paths_fall_back_to_name() {
        let key = LookupKey::build(&field(json!({"aliases": [["x", "y"]]})), "name", true).unwrap();
        assert_eq!(key.to_string(), "x.y | name");
        assert_eq!(key.get(&Value::from(json!({"name": true}))), Some(("name", &Value::Bool(true))));
    }
}
