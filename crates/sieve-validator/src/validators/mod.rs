//! # Validator Nodes
//!
//! [`CombinedValidator`] is the closed set of compiled node kinds. Every
//! operation on a node dispatches through an exhaustive `match`, so adding
//! a kind forces each operation to handle it.
//!
//! Nodes are immutable after compilation. Validation takes `&self` and an
//! explicit [`ValidationState`], so one tree can be shared by any number
//! of concurrent validations.

use serde::{Deserialize, Serialize};
use sieve_core::{LineError, Value};

mod any;
mod boolean;
mod int;
mod list;
mod nullable;
mod record;
mod string;
mod union;

pub use self::any::AnyValidator;
pub use self::boolean::BoolValidator;
pub use self::int::IntValidator;
pub use self::list::ListValidator;
pub use self::nullable::NullableValidator;
pub use self::record::{ExtraBehavior, RecordField, RecordValidator};
pub use self::string::{Pattern, StrValidator};
pub use self::union::UnionValidator;

/// Result of validating one node: the output value or every line error
/// found beneath it, with locations relative to that node.
pub type ValResult<T> = Result<T, Vec<LineError>>;

/// Call-site state threaded through a validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationState {
    strict: Option<bool>,
}

impl ValidationState {
    /// State for a call with an optional explicit strict flag.
    pub fn new(strict: Option<bool>) -> Self {
        Self { strict }
    }

    /// Effective strictness for a node whose own flag is `node_strict`.
    /// An explicit call-site flag always wins.
    pub fn strict_or(&self, node_strict: bool) -> bool {
        self.strict.unwrap_or(node_strict)
    }

    /// The same state with the call-site flag forced.
    pub fn with_strict(self, strict: bool) -> Self {
        Self { strict: Some(strict) }
    }
}

/// Behavior shared by every node kind.
pub trait Validator {
    /// Validate `input`, returning the coerced output.
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value>;

    /// Short kind label used in introspection and union error locations.
    fn kind_label(&self) -> &'static str;
}

/// A compiled validator node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombinedValidator {
    Str(StrValidator),
    Int(IntValidator),
    Bool(BoolValidator),
    Any(AnyValidator),
    Nullable(NullableValidator),
    Union(UnionValidator),
    List(ListValidator),
    Record(RecordValidator),
}

impl Validator for CombinedValidator {
    fn validate(&self, input: &Value, state: &ValidationState) -> ValResult<Value> {
        match self {
            Self::Str(v) => v.validate(input, state),
            Self::Int(v) => v.validate(input, state),
            Self::Bool(v) => v.validate(input, state),
            Self::Any(v) => v.validate(input, state),
            Self::Nullable(v) => v.validate(input, state),
            Self::Union(v) => v.validate(input, state),
            Self::List(v) => v.validate(input, state),
            Self::Record(v) => v.validate(input, state),
        }
    }

    fn kind_label(&self) -> &'static str {
        match self {
            Self::Str(v) => v.kind_label(),
            Self::Int(v) => v.kind_label(),
            Self::Bool(v) => v.kind_label(),
            Self::Any(v) => v.kind_label(),
            Self::Nullable(v) => v.kind_label(),
            Self::Union(v) => v.kind_label(),
            Self::List(v) => v.kind_label(),
            Self::Record(v) => v.kind_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_or_precedence() {
        let unset = ValidationState::default();
        assert!(unset.strict_or(true));
        assert!(!unset.strict_or(false));
        let lax = ValidationState::new(Some(false));
        assert!(!lax.strict_or(true));
        let strict = ValidationState::new(Some(true));
        assert!(strict.strict_or(false));
    }

    #[test]
    fn test_with_strict() {
        let state = ValidationState::new(Some(false)).with_strict(true);
        assert!(state.strict_or(false));
    }
}
