//! # sieve-core — Foundational Types for the sieve Validation Engine
//!
//! This crate defines the data models shared by the schema compiler and
//! the validation runtime. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One untyped value model.** [`Value`] carries validator input and
//!    validator output alike, including text that is not valid standalone
//!    Unicode (`Value::WideStr`) and binary data.
//!
//! 2. **Identity-carrying schema descriptions.** [`SchemaDict`] and
//!    [`SchemaList`] are shared handles, so a description can reference
//!    itself. Cycle detection keys on handle identity, never on content.
//!
//! 3. **Structured errors, rendered at the boundary.** [`SchemaError`] is a
//!    cause chain that renders to text only in `Display`; [`ValidationError`]
//!    is an ordered list of path-located [`LineError`]s.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sieve-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod schema;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use config::Config;
pub use error::{BuildField, ErrorType, LineError, LocItem, Location, SchemaError, ValidationError};
pub use schema::{Schema, SchemaDict, SchemaList};
pub use value::Value;
