//! Data model for runtime contracts.
//!
//! Everything a contract predicate can observe lives here: dynamic
//! [`Value`]s, the [`Signature`] descriptor of a callable, the actual
//! [`Call`], the bound [`Arguments`] record, instances and classes, and the
//! error kinds shared with the checking layer in `clause-check`.

pub mod bind;
pub mod call;
pub mod error;
pub mod function;
pub mod object;
pub mod record;
pub mod signature;
pub mod value;

// Re-export commonly used types
pub use bind::bind;
pub use call::Call;
pub use error::{
    ContractError, ContractKind, ContractViolation, DefinitionError, RecordError, SignatureError,
    ValueError,
};
pub use function::{Body, Function};
pub use object::{
    Callable, ClassRef, MethodEntry, MethodKey, MethodKind, ObjectRef, SpecialFamily, SpecialMethod,
};
pub use record::{rewrite, Arguments};
pub use signature::{Param, ParamKind, Signature};
pub use value::{Kind, Stream, Truthy, Value};
