//! # sieve-validator — Schema Compiler & Validation Runtime
//!
//! Compiles declarative schema descriptions into an immutable validator
//! tree and runs inputs through it, coercing in lax mode and rejecting
//! anything inexact in strict mode.
//!
//! ## Compilation (`build`)
//!
//! The [`build`] module walks a [`Schema`] description, dispatches on its
//! `"type"` key and produces a [`CombinedValidator`]. Self-referencing
//! descriptions are detected by handle identity and rejected; nesting is
//! capped at [`MAX_SCHEMA_DEPTH`]. Every failure is reported as a chained
//! [`SchemaError`] naming the validator kind and field where it occurred.
//!
//! ## Validation (`engine`, `validators`)
//!
//! [`SchemaValidator`] is the entry point. Each node kind lives in its own
//! module under [`validators`]; failures accumulate as located
//! [`LineError`]s and surface as one [`ValidationError`]. Record fields
//! find their input through a [`LookupKey`], by name or by alias paths
//! into nested data.
//!
//! ## Persistence (`serialize`)
//!
//! [`serialize`]/[`deserialize`] round-trip a compiled validator through
//! any [`Protocol`] version without changing its behavior.
//!
//! ## Crate Policy
//!
//! - Depends only on `sieve-core` internally.
//! - A compiled tree is never mutated; `SchemaValidator` is `Send + Sync`.
//! - No `.unwrap()` outside tests.

pub mod build;
pub mod engine;
pub mod lookup_key;
pub mod serialize;
pub mod validators;

pub use build::{BuildContext, BuildValidator, MAX_DEFAULT_DEPTH, MAX_SCHEMA_DEPTH};
pub use engine::SchemaValidator;
pub use lookup_key::{LookupKey, LookupPath, PathItem};
pub use serialize::{deserialize, serialize, Protocol, SerializeError, HIGHEST_PROTOCOL};
pub use validators::{
    AnyValidator, BoolValidator, CombinedValidator, ExtraBehavior, IntValidator, ListValidator, NullableValidator,
    Pattern, RecordField, RecordValidator, StrValidator, UnionValidator, ValidationState, Validator,
};

pub use sieve_core::{
    Config, ErrorType, LineError, LocItem, Location, Schema, SchemaDict, SchemaError, SchemaList, ValidationError,
    Value,
};
