//! Error types shared by the data model and the checking layer.
//!
//! Uses `thiserror` for structured, matchable variants. The three failure
//! kinds a contracted call can produce ([`SignatureError`],
//! [`ContractViolation`] and a predicate/body fault) are kept apart in
//! [`ContractError`] so callers can tell a bad call from a broken contract
//! from a broken predicate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Kind;

/// A call could not be matched against the callee's signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// A required parameter received no positional, keyword or default value.
    #[error("{function} missing required argument: '{name}'")]
    MissingArgument { function: String, name: String },

    /// More positional values than positional parameters, and no variadic slot.
    #[error("{function} takes {expected} positional argument(s) but {given} were given")]
    TooManyPositional {
        function: String,
        expected: usize,
        given: usize,
    },

    /// A keyword argument names a parameter already filled positionally.
    #[error("{function} got multiple values for argument '{name}'")]
    MultipleValues { function: String, name: String },

    /// A keyword argument names no parameter, and there is no keyword slot.
    #[error("{function} got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { function: String, name: String },

    /// Method dispatch found nothing under this name.
    #[error("'{class}' has no method '{method}'")]
    UnknownMethod { class: String, method: String },

    /// A method was invoked without an instance (or class) receiver.
    #[error("{function} requires a receiver as its first argument")]
    MissingReceiver { function: String },
}

/// Field access on an [`Arguments`](crate::record::Arguments) record failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A predicate or rewrite named a field the record does not have.
    #[error("argument record of {function} has no field '{name}'")]
    UnknownField { function: String, name: String },

    /// The record has no `self` field holding an instance.
    #[error("argument record of {function} has no receiver object")]
    MissingReceiver { function: String },
}

/// A [`Value`](crate::value::Value) was used in a way its kind does not support.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value is not of the kind the caller expected.
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: Kind, got: Kind },

    /// Length was requested of a value that has none (streams included).
    #[error("value of kind {kind} has no length")]
    Unsized { kind: Kind },

    /// Elements were requested of a scalar, instance or class.
    #[error("value of kind {kind} is not iterable")]
    NotIterable { kind: Kind },

    /// Neither the instance nor its class has the attribute.
    #[error("'{class}' object has no attribute '{name}'")]
    MissingAttribute { class: String, name: String },
}

/// A contract, signature or class was declared incorrectly.
///
/// Raised when the definition is built, never per call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A condition was declared with a blank description.
    #[error("contract on {target} has an empty description")]
    EmptyDescription { target: String },

    /// Two parameters of one signature share a name.
    #[error("{function} declares parameter '{name}' more than once")]
    DuplicateParameter { function: String, name: String },

    /// A parameter without a default comes after one with a default.
    #[error("{function}: required parameter '{name}' follows a parameter with a default")]
    RequiredAfterDefault { function: String, name: String },

    /// A `types` clause constrains a parameter the signature lacks.
    #[error("type constraint on {function} names undeclared parameter '{name}'")]
    UnknownParameter { function: String, name: String },

    /// A method table key was installed twice.
    #[error("class '{class}' defines method '{method}' more than once")]
    DuplicateMethod { class: String, method: String },

    /// A method signature has no `self` or `cls` parameter.
    #[error("method '{method}' of class '{class}' does not declare a receiver parameter")]
    MissingReceiver { class: String, method: String },
}

/// The kind of condition that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// Checked over the bound arguments before the body runs.
    Precondition,
    /// Checked over the bound arguments and the result after the body returns.
    Postcondition,
    /// Checked over the receiving instance around every guarded method call.
    Invariant,
    /// The aggregate runtime type check produced by `types`.
    TypeCheck,
}

/// A predicate evaluated to false.
///
/// Displays as the violated condition's description, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{description}")]
pub struct ContractViolation {
    /// What kind of condition failed.
    pub kind: ContractKind,
    /// Name of the callable (or class, for invariants) the condition belongs to.
    pub callable: String,
    /// Human-readable description attached to the condition.
    pub description: String,
}

/// Everything a contracted call can fail with.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Violation(#[from] ContractViolation),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A predicate, transform or body raised its own error.
    #[error(transparent)]
    Fault(anyhow::Error),
}

impl ContractError {
    /// Converts an error raised by user code into a `ContractError`.
    ///
    /// If the error already is a `ContractError` (a nested contracted call
    /// failed inside a body or predicate) it is returned unchanged, otherwise
    /// it is carried as a [`ContractError::Fault`].
    pub fn from_fault(err: anyhow::Error) -> Self {
        match err.downcast::<ContractError>() {
            Ok(inner) => inner,
            Err(err) => ContractError::Fault(err),
        }
    }

    /// Returns the violation if this error is one.
    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            ContractError::Violation(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` if a condition evaluated to false.
    pub fn is_violation(&self) -> bool {
        matches!(self, ContractError::Violation(_))
    }
}

impl From<RecordError> for ContractError {
    fn from(err: RecordError) -> Self {
        ContractError::Fault(err.into())
    }
}

impl From<ValueError> for ContractError {
    fn from(err: ValueError) -> Self {
        ContractError::Fault(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_displays_description_only() {
        let v = ContractViolation {
            kind: ContractKind::Precondition,
            callable: "add2".into(),
            description: "`i` must be an integer".into(),
        };
        let err = ContractError::from(v);
        assert_eq!(err.to_string(), "`i` must be an integer");
        assert!(err.is_violation());
    }

    #[test]
    fn from_fault_unwraps_nested_contract_errors() {
        let inner = ContractError::from(ContractViolation {
            kind: ContractKind::Invariant,
            callable: "Stack".into(),
            description: "depth is bounded".into(),
        });
        let nested = ContractError::from_fault(anyhow::Error::new(inner));
        assert_eq!(
            nested.violation().map(|v| v.description.as_str()),
            Some("depth is bounded")
        );

        let plain = ContractError::from_fault(anyhow::anyhow!("disk on fire"));
        assert!(matches!(plain, ContractError::Fault(_)));
        assert_eq!(plain.to_string(), "disk on fire");
    }

    #[test]
    fn record_value_and_definition_messages() {
        let unknown = RecordError::UnknownField {
            function: "f".into(),
            name: "y".into(),
        };
        assert_eq!(unknown.to_string(), "argument record of f has no field 'y'");
        let mismatch = ValueError::TypeMismatch {
            expected: Kind::Int,
            got: Kind::Instance("Point".into()),
        };
        assert_eq!(mismatch.to_string(), "expected int, got Point");
        let missing = ValueError::MissingAttribute {
            class: "Point".into(),
            name: "z".into(),
        };
        assert_eq!(missing.to_string(), "'Point' object has no attribute 'z'");
        let duplicate = DefinitionError::DuplicateMethod {
            class: "Point".into(),
            method: "norm".into(),
        };
        assert_eq!(
            duplicate.to_string(),
            "class 'Point' defines method 'norm' more than once"
        );
    }

    #[test]
    fn violation_serializes_with_snake_case_kind() {
        let v = ContractViolation {
            kind: ContractKind::TypeCheck,
            callable: "func".into(),
            description: "the types of arguments must be valid".into(),
        };
        insta::assert_json_snapshot!(v, @r###"
        {
          "kind": "type_check",
          "callable": "func",
          "description": "the types of arguments must be valid"
        }
        "###);
    }
}
