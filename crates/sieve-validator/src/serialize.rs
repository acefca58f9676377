//! # Validator Serialization
//!
//! Persists a compiled [`SchemaValidator`] as bytes and reconstructs an
//! equivalent, distinct instance. For every protocol the reconstructed
//! validator accepts, rejects and coerces exactly as the original, and
//! [`SchemaValidator::describe`] returns identical text.
//!
//! ## Encoding
//!
//! One leading version byte followed by the protocol payload:
//!
//! | Version | Protocol       | Payload                      |
//! |---------|----------------|------------------------------|
//! | 1       | `Json`         | compact `serde_json`         |
//! | 2       | `JsonPretty`   | indented `serde_json`        |
//! | 3       | `Yaml`         | `serde_yaml`                 |
//!
//! Compiled patterns are stored as their source text and recompiled on
//! load. Any tree the compiler accepts restores under every protocol: the
//! JSON protocols lift serde_json's nesting limit, and
//! [`MAX_SCHEMA_DEPTH`](crate::MAX_SCHEMA_DEPTH) together with
//! [`MAX_DEFAULT_DEPTH`](crate::MAX_DEFAULT_DEPTH) keep the deepest tree
//! within the 128 levels `serde_yaml` reads.

use serde::Deserialize;
use thiserror::Error;

use crate::engine::SchemaValidator;

/// A serialization protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Json = 1,
    JsonPretty = 2,
    Yaml = 3,
}

/// The newest protocol version.
pub const HIGHEST_PROTOCOL: Protocol = Protocol::Yaml;

impl Protocol {
    /// Every supported protocol, oldest first.
    pub fn all() -> [Protocol; 3] {
        [Protocol::Json, Protocol::JsonPretty, Protocol::Yaml]
    }

    /// The version byte written ahead of the payload.
    pub fn version(self) -> u8 {
        self as u8
    }

    pub fn from_version(version: u8) -> Option<Self> {
        Self::all().into_iter().find(|p| p.version() == version)
    }
}

/// Failure while serializing or deserializing a validator.
#[derive(Error, Debug)]
pub enum SerializeError {
    /// No bytes to read a version from.
    #[error("cannot deserialize validator from empty input")]
    Empty,

    /// The leading byte names no known protocol.
    #[error("unsupported serialization protocol version {0}")]
    UnsupportedProtocol(u8),

    /// JSON encoding or decoding failed.
    #[error("json payload error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding or decoding failed.
    #[error("yaml payload error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The YAML payload was not UTF-8.
    #[error("yaml payload is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Serialize `validator` with `protocol`.
///
/// # Errors
///
/// Returns `SerializeError::Json`/`Yaml` if the payload encoder fails.
pub fn serialize(validator: &SchemaValidator, protocol: Protocol) -> Result<Vec<u8>, SerializeError> {
    let mut bytes = vec![protocol.version()];
    match protocol {
        Protocol::Json => serde_json::to_writer(&mut bytes, validator)?,
        Protocol::JsonPretty => serde_json::to_writer_pretty(&mut bytes, validator)?,
        Protocol::Yaml => bytes.extend_from_slice(serde_yaml::to_string(validator)?.as_bytes()),
    }
    tracing::debug!(protocol = protocol.version(), len = bytes.len(), "validator serialized");
    Ok(bytes)
}

/// Reconstruct a validator from bytes produced by [`serialize`].
///
/// # Errors
///
/// Returns `SerializeError::Empty` or `UnsupportedProtocol` for a missing
/// or unknown version byte, and a payload error if decoding fails or a
/// stored pattern no longer compiles.
pub fn deserialize(bytes: &[u8]) -> Result<SchemaValidator, SerializeError> {
    let (&version, payload) = bytes.split_first().ok_or(SerializeError::Empty)?;
    let protocol = Protocol::from_version(version).ok_or(SerializeError::UnsupportedProtocol(version))?;
    let validator = match protocol {
        Protocol::Json | Protocol::JsonPretty => {
            let mut de = serde_json::Deserializer::from_slice(payload);
            de.disable_recursion_limit();
            let validator = SchemaValidator::deserialize(&mut de)?;
            de.end()?;
            validator
        }
        Protocol::Yaml => serde_yaml::from_str(std::str::from_utf8(payload)?)?,
    };
    tracing::debug!(protocol = version, len = bytes.len(), "validator deserialized");
    Ok(validator)
}

impl SchemaValidator {
    /// Shorthand for [`serialize`].
    pub fn to_bytes(&self, protocol: Protocol) -> Result<Vec<u8>, SerializeError> {
        serialize(self, protocol)
    }

    /// Shorthand for [`deserialize`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializeError> {
        deserialize(bytes)
    }
}
