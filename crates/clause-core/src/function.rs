//! Plain callables: a signature plus a body, no contract checks.
//!
//! [`Function`] is what a contract wraps. Invoking it binds the call and
//! hands the resulting record to the body.

use std::fmt;
use std::sync::Arc;

use crate::bind::bind;
use crate::call::Call;
use crate::error::ContractError;
use crate::object::Callable;
use crate::record::Arguments;
use crate::signature::Signature;
use crate::value::Value;

/// Function body: receives the bound record, returns the result.
pub type Body = dyn Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync;

#[derive(Clone)]
pub struct Function {
    signature: Signature,
    body: Arc<Body>,
}

impl Function {
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Function {
            signature,
            body: Arc::new(body),
        }
    }

    /// Runs the body over an already bound record.
    pub fn invoke(&self, args: &Arguments) -> Result<Value, ContractError> {
        (self.body)(args).map_err(ContractError::from_fault)
    }
}

impl Callable for Function {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, call: Call) -> Result<Value, ContractError> {
        let args = bind(&self.signature, call)?;
        self.invoke(&args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
