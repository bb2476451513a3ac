//! Runtime contract checking over the `clause-core` data model.
//!
//! - [`contracts`] builds contracted callables from preconditions,
//!   postconditions, type checks and argument transforms.
//! - [`invariant`] defines classes whose eligible methods are guarded by
//!   class invariants.
//! - [`toggle`] and [`config`] decide whether any of it is active.

pub mod config;
pub mod contracts;
pub mod invariant;
pub mod toggle;

pub use config::{CheckMode, ContractConfig};
pub use contracts::{
    ensure, require, transform, types, Clause, Condition, Contract, Contracted, Subject,
    TypeSpec, TYPES_DESCRIPTION,
};
pub use invariant::{invariant, ClassBuilder, Guarded};

/// Everything needed to declare and call contracted code.
pub mod prelude {
    pub use crate::config::{CheckMode, ContractConfig};
    pub use crate::contracts::{ensure, require, transform, types, Contract, TypeSpec};
    pub use crate::invariant::{invariant, ClassBuilder};
    pub use clause_core::{
        rewrite, Arguments, Call, Callable, ClassRef, ContractError, ContractKind,
        ContractViolation, Function, Kind, ObjectRef, Signature, SpecialMethod, Stream, Value,
    };
}
