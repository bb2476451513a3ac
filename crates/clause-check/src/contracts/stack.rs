//! Ordered evaluation of a stack of conditions.
//!
//! Conditions run in declaration order. The first one that does not hold
//! produces a [`ContractViolation`]; the ones after it are never evaluated.
//! A predicate that fails with its own error propagates that error untouched.

use std::sync::Arc;

use clause_core::{ContractError, ContractViolation};
use tracing::{debug, trace};

use super::condition::{Condition, Subject};

/// Immutable, shareable list of conditions owned by one callable or class.
#[derive(Debug, Clone)]
pub struct ContractStack {
    owner: String,
    conditions: Arc<[Condition]>,
}

impl ContractStack {
    pub fn new(owner: impl Into<String>, conditions: Vec<Condition>) -> Self {
        ContractStack {
            owner: owner.into(),
            conditions: conditions.into(),
        }
    }

    pub fn empty(owner: impl Into<String>) -> Self {
        ContractStack::new(owner, Vec::new())
    }

    /// Name of the callable or class the conditions belong to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates every condition against `subject`, failing fast.
    pub fn evaluate(&self, subject: Subject<'_>) -> Result<(), ContractError> {
        for condition in self.conditions.iter() {
            trace!(
                owner = %self.owner,
                kind = ?condition.kind(),
                description = condition.description(),
                "evaluating condition"
            );
            match condition.holds(subject) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(
                        owner = %self.owner,
                        kind = ?condition.kind(),
                        description = condition.description(),
                        "contract violated"
                    );
                    return Err(ContractViolation {
                        kind: condition.kind(),
                        callable: self.owner.clone(),
                        description: condition.description().to_string(),
                    }
                    .into());
                }
                Err(fault) => return Err(ContractError::from_fault(fault)),
            }
        }
        Ok(())
    }
}
