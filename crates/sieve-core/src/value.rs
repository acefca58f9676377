//! # Untyped Values
//!
//! `Value` is the dynamically-typed data model that flows through the
//! validation runtime. The same type carries validator *input* (whatever
//! the caller hands over) and validator *output* (the coerced result).
//!
//! ## Text Representation
//!
//! Native text comes in two shapes:
//!
//! - [`Value::Str`] — well-formed Unicode, stored as UTF-8.
//! - [`Value::WideStr`] — text held as UTF-16 code units. This shape can
//!   carry unpaired surrogates, which are legal inside an opaque in-memory
//!   text object but are not valid standalone Unicode. Validators pass such
//!   values through untouched unless they need to inspect the characters.
//!
//! Binary input (`Bytes`, `ByteArray`) is distinct from text: only lax-mode
//! string validation decodes it.
//!
//! ## Rendering
//!
//! [`Value::repr`] renders literal-style text (`'foo'`, `b'\x81'`, `None`)
//! used by error messages, and [`Value::type_name`] names the input type.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// An untyped value: validator input or validator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The absent value.
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Well-formed text.
    Str(String),
    /// Text as UTF-16 code units, possibly containing unpaired surrogates.
    WideStr(Vec<u16>),
    /// Immutable binary data.
    Bytes(Vec<u8>),
    /// Mutable-buffer binary data.
    ByteArray(Vec<u8>),
    /// An ordered sequence.
    List(Vec<Value>),
    /// An ordered mapping from string keys to values.
    Dict(Vec<(String, Value)>),
}

impl Value {
    /// Build a [`Value::WideStr`] from UTF-16 code units.
    pub fn wide(units: impl IntoIterator<Item = u16>) -> Self {
        Self::WideStr(units.into_iter().collect())
    }

    /// Build a [`Value::Dict`] from key/value pairs, preserving order.
    pub fn dict<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Dict(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The name of this value's type, as shown in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) | Self::WideStr(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::ByteArray(_) => "bytearray",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
        }
    }

    /// Look up a key in a [`Value::Dict`]. Returns `None` for other kinds.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Dict(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Literal-style rendering used in error reports.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            Self::None => out.push_str("None"),
            Self::Bool(true) => out.push_str("True"),
            Self::Bool(false) => out.push_str("False"),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Float(f) => out.push_str(&float_repr(*f)),
            Self::Str(s) => write_str_repr(out, s.chars().map(Ok)),
            Self::WideStr(units) => write_str_repr(
                out,
                char::decode_utf16(units.iter().copied()).map(|r| r.map_err(|e| e.unpaired_surrogate())),
            ),
            Self::Bytes(b) => write_bytes_repr(out, b),
            Self::ByteArray(b) => {
                out.push_str("bytearray(");
                write_bytes_repr(out, b);
                out.push(')');
            }
            Self::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out);
                }
                out.push(']');
            }
            Self::Dict(pairs) => {
                out.push('{');
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_str_repr(out, k.chars().map(Ok));
                    out.push_str(": ");
                    v.write_repr(out);
                }
                out.push('}');
            }
        }
    }

    /// Convert to a `serde_json::Value` for export.
    ///
    /// Lossy for values JSON cannot express: wide text with unpaired
    /// surrogates and non-UTF-8 binary data use replacement characters,
    /// and non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::None => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Str(s) => Json::String(s.clone()),
            Self::WideStr(units) => Json::String(String::from_utf16_lossy(units)),
            Self::Bytes(b) | Self::ByteArray(b) => Json::String(String::from_utf8_lossy(b).into_owned()),
            Self::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Dict(pairs) => Json::Object(pairs.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
        }
    }
}

fn float_repr(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let s = if f > 0.0 { "inf" } else { "-inf" };
        s.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// Render text between quotes, escaping control characters. `Err` items are
/// unpaired surrogates and render as `\udXXX`.
fn write_str_repr(out: &mut String, chars: impl Iterator<Item = Result<char, u16>> + Clone) {
    let has_single = chars.clone().any(|c| c == Ok('\''));
    let has_double = chars.clone().any(|c| c == Ok('"'));
    let quote = if has_single && !has_double { '"' } else { '\'' };
    out.push(quote);
    for c in chars {
        match c {
            Ok('\\') => out.push_str("\\\\"),
            Ok('\n') => out.push_str("\\n"),
            Ok('\r') => out.push_str("\\r"),
            Ok('\t') => out.push_str("\\t"),
            Ok(c) if c == quote => {
                out.push('\\');
                out.push(c);
            }
            Ok(c) if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            Ok(c) => out.push(c),
            Err(surrogate) => {
                let _ = write!(out, "\\u{surrogate:04x}");
            }
        }
    }
    out.push(quote);
}

fn write_bytes_repr(out: &mut String, bytes: &[u8]) {
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push('\'');
}

impl From<serde_json::Value> for Value {
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
            Json::Array(items) => Self::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Self::Dict(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}
