//! # Schema Descriptions
//!
//! The untyped input to the schema compiler: either a short-form type name
//! (`"int"`) or a record with a `"type"` discriminant plus constraint
//! fields, nesting further descriptions under named keys or in lists.
//!
//! ## Identity
//!
//! Containers ([`SchemaDict`], [`SchemaList`]) are shared handles. Cloning
//! a handle does not copy the container, so the same description object
//! can be referenced from several places, including from inside itself.
//! [`SchemaDict::identity`] and [`SchemaList::identity`] expose the address
//! of the shared allocation; the compiler's cycle detection keys on it.
//!
//! Descriptions built with `From<serde_json::Value>` never share
//! containers: every object and array becomes a distinct instance.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// An untyped schema description node.
#[derive(Debug, Clone)]
pub enum Schema {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(SchemaList),
    Dict(SchemaDict),
}

impl Schema {
    /// The primitive kind of this description, as used in `TypeError` text.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
        }
    }

    /// Convert a description fragment to a plain [`Value`], e.g. a field
    /// default. Returns `None` if the fragment contains a reference cycle.
    pub fn to_value(&self) -> Option<Value> {
        self.to_value_inner(&mut Vec::new())
    }

    fn to_value_inner(&self, path: &mut Vec<usize>) -> Option<Value> {
        match self {
            Self::None => Some(Value::None),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Int(i) => Some(Value::Int(*i)),
            Self::Float(f) => Some(Value::Float(*f)),
            Self::Str(s) => Some(Value::Str(s.clone())),
            Self::List(list) => {
                if path.contains(&list.identity()) {
                    return None;
                }
                path.push(list.identity());
                let items = list
                    .items()
                    .iter()
                    .map(|item| item.to_value_inner(path))
                    .collect::<Option<Vec<_>>>();
                path.pop();
                items.map(Value::List)
            }
            Self::Dict(dict) => {
                if path.contains(&dict.identity()) {
                    return None;
                }
                path.push(dict.identity());
                let pairs = dict
                    .entries()
                    .into_iter()
                    .map(|(k, v)| v.to_value_inner(path).map(|v| (k, v)))
                    .collect::<Option<Vec<_>>>();
                path.pop();
                pairs.map(Value::Dict)
            }
        }
    }
}

/// A shared, ordered string-keyed description record.
#[derive(Clone, Default)]
pub struct SchemaDict(Rc<RefCell<Vec<(String, Schema)>>>);

impl SchemaDict {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key, keeping the original position on replace.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Schema>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.0.borrow_mut();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, key: impl Into<String>, value: impl Into<Schema>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a key. The returned handle shares any nested container.
    pub fn get(&self, key: &str) -> Option<Schema> {
        self.0.borrow().iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().iter().any(|(k, _)| k == key)
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(String, Schema)> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Address of the shared allocation; equal for clones of one handle.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for SchemaDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: a self-referencing record must not recurse here.
        let keys: Vec<String> = self.0.borrow().iter().map(|(k, _)| k.clone()).collect();
        f.debug_struct("SchemaDict")
            .field("identity", &format_args!("{:#x}", self.identity()))
            .field("keys", &keys)
            .finish()
    }
}

/// A shared, ordered description list.
#[derive(Clone, Default)]
pub struct SchemaList(Rc<RefCell<Vec<Schema>>>);

impl SchemaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: impl Into<Schema>) {
        self.0.borrow_mut().push(value.into());
    }

    pub fn get(&self, index: usize) -> Option<Schema> {
        self.0.borrow().get(index).cloned()
    }

    /// Snapshot of the items in order.
    pub fn items(&self) -> Vec<Schema> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Address of the shared allocation; equal for clones of one handle.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for SchemaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaList")
            .field("identity", &format_args!("{:#x}", self.identity()))
            .field("len", &self.len())
            .finish()
    }
}

impl From<serde_json::Value> for Schema {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::None,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::Str(s),
            Json::Array(items) => {
                let list = SchemaList::new();
                for item in items {
                    list.push(Schema::from(item));
                }
                Self::List(list)
            }
            Json::Object(map) => {
                let dict = SchemaDict::new();
                for (k, v) in map {
                    dict.insert(k, Schema::from(v));
                }
                Self::Dict(dict)
            }
        }
    }
}

impl From<&str> for Schema {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Schema {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Schema {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Schema {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<SchemaDict> for Schema {
    fn from(d: SchemaDict) -> Self {
        Self::Dict(d)
    }
}

impl From<SchemaList> for Schema {
    fn from(l: SchemaList) -> Self {
        Self::List(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_shares_identity() {
        let d = SchemaDict::new();
        let d2 = d.clone();
        assert_eq!(d.identity(), d2.identity());
        d2.insert("type", "int");
        assert!(d.contains_key("type"));
    }

    #[test]
    fn test_distinct_dicts_distinct_identity() {
        let a = SchemaDict::new().with("type", "int");
        let b = SchemaDict::new().with("type", "int");
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let d = SchemaDict::new().with("a", 1i64).with("b", 2i64);
        d.insert("a", 3i64);
        let keys: Vec<String> = d.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(matches!(d.get("a"), Some(Schema::Int(3))));
    }

    #[test]
    fn test_from_json_builds_unshared_tree() {
        let s = Schema::from(json!({"type": "union", "choices": [{"type": "int"}, {"type": "int"}]}));
        let Schema::Dict(d) = s else { panic!("expected dict") };
        let Some(Schema::List(choices)) = d.get("choices") else { panic!("expected list") };
        let ids: Vec<usize> = choices
            .items()
            .iter()
            .map(|c| match c {
                Schema::Dict(d) => d.identity(),
                other => panic!("expected dict, got {other:?}"),
            })
            .collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_debug_on_cyclic_dict_terminates() {
        let d = SchemaDict::new();
        d.insert("self", d.clone());
        let rendered = format!("{d:?}");
        assert!(rendered.contains("self"));
    }

    #[test]
    fn test_to_value() {
        let s = Schema::from(json!({"a": [1, "x", null]}));
        assert_eq!(
            s.to_value(),
            Some(Value::dict([("a", Value::List(vec![Value::Int(1), Value::from("x"), Value::None]))]))
        );
    }

    #[test]
    fn test_to_value_cycle_is_none() {
        let l = SchemaList::new();
        l.push(l.clone());
        assert_eq!(Schema::List(l).to_value(), None);
    }
}
