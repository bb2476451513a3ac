//! Condition records: a description paired with a predicate.

use std::fmt;
use std::sync::Arc;

use clause_core::{Arguments, ContractKind, ObjectRef, Truthy, Value};

type ArgumentsFn = dyn Fn(&Arguments) -> anyhow::Result<bool> + Send + Sync;
type ResultFn = dyn Fn(&Arguments, &Value) -> anyhow::Result<bool> + Send + Sync;
type InstanceFn = dyn Fn(&ObjectRef) -> anyhow::Result<bool> + Send + Sync;

/// A predicate, already normalized to return a plain boolean.
#[derive(Clone)]
pub enum Predicate {
    /// Over the argument record (preconditions, type checks).
    Arguments(Arc<ArgumentsFn>),
    /// Over the argument record and the result (postconditions).
    Result(Arc<ResultFn>),
    /// Over the receiving instance (invariants).
    Instance(Arc<InstanceFn>),
}

/// What a condition is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Arguments(&'a Arguments),
    Result(&'a Arguments, &'a Value),
    Instance(&'a ObjectRef),
}

/// An immutable condition: description, predicate and kind.
#[derive(Clone)]
pub struct Condition {
    description: String,
    kind: ContractKind,
    predicate: Predicate,
}

impl Condition {
    pub fn precondition<F, V>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<V> + Send + Sync + 'static,
        V: Truthy,
    {
        Condition {
            description: description.into(),
            kind: ContractKind::Precondition,
            predicate: Predicate::Arguments(Arc::new(move |args| {
                predicate(args).map(|v| v.truthy())
            })),
        }
    }

    pub fn postcondition<F, V>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Arguments, &Value) -> anyhow::Result<V> + Send + Sync + 'static,
        V: Truthy,
    {
        Condition {
            description: description.into(),
            kind: ContractKind::Postcondition,
            predicate: Predicate::Result(Arc::new(move |args, result| {
                predicate(args, result).map(|v| v.truthy())
            })),
        }
    }

    pub fn invariant<F, V>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ObjectRef) -> anyhow::Result<V> + Send + Sync + 'static,
        V: Truthy,
    {
        Condition {
            description: description.into(),
            kind: ContractKind::Invariant,
            predicate: Predicate::Instance(Arc::new(move |obj| predicate(obj).map(|v| v.truthy()))),
        }
    }

    pub(crate) fn type_check<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Condition {
            description: description.into(),
            kind: ContractKind::TypeCheck,
            predicate: Predicate::Arguments(Arc::new(predicate)),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Evaluates the predicate.
    ///
    /// A subject that does not fit the predicate (an invariant handed an
    /// argument record, say) is a fault, not a failed condition.
    pub fn holds(&self, subject: Subject<'_>) -> anyhow::Result<bool> {
        match (&self.predicate, subject) {
            (Predicate::Arguments(p), Subject::Arguments(args)) => p(args),
            // Preconditions may also run where a result is at hand.
            (Predicate::Arguments(p), Subject::Result(args, _)) => p(args),
            (Predicate::Result(p), Subject::Result(args, result)) => p(args, result),
            (Predicate::Instance(p), Subject::Instance(obj)) => p(obj),
            (_, subject) => Err(anyhow::anyhow!(
                "{:?} condition \"{}\" cannot be evaluated against {}",
                self.kind,
                self.description,
                match subject {
                    Subject::Arguments(_) => "an argument record",
                    Subject::Result(..) => "a call result",
                    Subject::Instance(_) => "an instance",
                }
            )),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
