//! Contracts on callables.
//!
//! A [`Contract`] collects clauses in declaration order and wraps a body
//! into a [`Contracted`] callable. Per call, the evaluation order is fixed:
//! bind, transforms, preconditions (including type checks), body,
//! postconditions. The first failing condition stops evaluation.

pub mod builder;
pub mod condition;
pub mod stack;
pub mod types;

pub use builder::{ensure, require, transform, types, Clause, Contract, Contracted, Transform};
pub use condition::{Condition, Predicate, Subject};
pub use stack::ContractStack;
pub use types::{TypeCheck, TypeSpec, TYPES_DESCRIPTION};
