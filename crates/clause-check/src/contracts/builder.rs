//! Declaring contracts and wrapping bodies in them.
//!
//! Clauses are accumulated into one ordered list as they are declared, so
//! the conditions run in the order they were written no matter how many
//! clauses there are:
//!
//! ```ignore
//! let add2 = Contract::new(Signature::new("add2").param("i").param("j"))
//!     .require("`i` must be an integer", |a| Ok(a.get("i")?.is_int()))
//!     .require("`j` must be an integer", |a| Ok(a.get("j")?.is_int()))
//!     .build(|a| Ok(Value::Int(a.get("i")?.expect_int()? + a.get("j")?.expect_int()?)))?;
//!
//! assert_eq!(add2.call(Call::positional([1, 2]))?, Value::Int(3));
//! ```

use std::fmt;
use std::sync::Arc;

use clause_core::{
    bind, Arguments, Call, Callable, ContractError, DefinitionError, Function, Signature, Truthy,
    Value,
};
use tracing::debug;

use super::condition::{Condition, Subject};
use super::stack::ContractStack;
use super::types::{TypeCheck, TypeSpec};
use crate::config::ContractConfig;

type TransformFn = dyn Fn(&Arguments) -> anyhow::Result<Arguments> + Send + Sync;

/// A rewrite step run on the argument record before any precondition.
#[derive(Clone)]
pub struct Transform(Arc<TransformFn>);

impl Transform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Arguments> + Send + Sync + 'static,
    {
        Transform(Arc::new(f))
    }

    pub fn apply(&self, args: &Arguments) -> Result<Arguments, ContractError> {
        (self.0)(args).map_err(ContractError::from_fault)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// One declared element of a contract.
#[derive(Debug, Clone)]
pub enum Clause {
    Require(Condition),
    Ensure(Condition),
    Types(TypeCheck),
    Transform(Transform),
}

/// A precondition over the argument record.
pub fn require<F, V>(description: impl Into<String>, predicate: F) -> Clause
where
    F: Fn(&Arguments) -> anyhow::Result<V> + Send + Sync + 'static,
    V: Truthy,
{
    Clause::Require(Condition::precondition(description, predicate))
}

/// A postcondition over the argument record and the result.
pub fn ensure<F, V>(description: impl Into<String>, predicate: F) -> Clause
where
    F: Fn(&Arguments, &Value) -> anyhow::Result<V> + Send + Sync + 'static,
    V: Truthy,
{
    Clause::Ensure(Condition::postcondition(description, predicate))
}

/// One aggregate type-check precondition over the named parameters.
pub fn types<I, K, T>(requirements: I) -> Clause
where
    I: IntoIterator<Item = (K, T)>,
    K: Into<String>,
    T: Into<TypeSpec>,
{
    Clause::Types(TypeCheck::new(requirements))
}

/// A rewrite of the argument record, run before preconditions.
pub fn transform<F>(f: F) -> Clause
where
    F: Fn(&Arguments) -> anyhow::Result<Arguments> + Send + Sync + 'static,
{
    Clause::Transform(Transform::new(f))
}

/// Contract declaration for one callable.
pub struct Contract {
    signature: Signature,
    clauses: Vec<Clause>,
    config: ContractConfig,
}

impl Contract {
    pub fn new(signature: Signature) -> Self {
        Contract {
            signature,
            clauses: Vec::new(),
            config: ContractConfig::default(),
        }
    }

    /// Appends a clause after those already declared.
    pub fn clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn require<F, V>(self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<V> + Send + Sync + 'static,
        V: Truthy,
    {
        self.clause(require(description, predicate))
    }

    pub fn ensure<F, V>(self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Arguments, &Value) -> anyhow::Result<V> + Send + Sync + 'static,
        V: Truthy,
    {
        self.clause(ensure(description, predicate))
    }

    pub fn types<I, K, T>(self, requirements: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<TypeSpec>,
    {
        self.clause(types(requirements))
    }

    pub fn transform<F>(self, f: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Arguments> + Send + Sync + 'static,
    {
        self.clause(transform(f))
    }

    /// Overrides the process-wide toggle for this contract.
    pub fn with_config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the declaration and wraps `body` in it.
    ///
    /// When checks are inactive the returned callable carries no conditions
    /// and no transforms at all.
    pub fn build<F>(self, body: F) -> Result<Contracted, DefinitionError>
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.signature.validate()?;
        let name = self.signature.name().to_string();

        let mut transforms = Vec::new();
        let mut preconditions = Vec::new();
        let mut postconditions = Vec::new();
        for clause in self.clauses {
            match clause {
                Clause::Require(condition) => {
                    check_description(&name, &condition)?;
                    preconditions.push(condition);
                }
                Clause::Ensure(condition) => {
                    check_description(&name, &condition)?;
                    postconditions.push(condition);
                }
                Clause::Types(check) => {
                    if let Some(unknown) = check.names().find(|n| !self.signature.declares(n)) {
                        return Err(DefinitionError::UnknownParameter {
                            function: name,
                            name: unknown.to_string(),
                        });
                    }
                    preconditions.push(check.into_condition());
                }
                Clause::Transform(t) => transforms.push(t),
            }
        }

        let function = Function::new(self.signature, body);
        if !self.config.is_active() {
            debug!(callable = %name, "contract checks disabled, callable left unwrapped");
            return Ok(Contracted {
                function,
                checks: None,
                config: self.config,
            });
        }

        debug!(
            callable = %name,
            transforms = transforms.len(),
            preconditions = preconditions.len(),
            postconditions = postconditions.len(),
            "contract built"
        );
        Ok(Contracted {
            function,
            checks: Some(Checks {
                transforms: transforms.into(),
                preconditions: ContractStack::new(name.clone(), preconditions),
                postconditions: ContractStack::new(name, postconditions),
            }),
            config: self.config,
        })
    }
}

fn check_description(function: &str, condition: &Condition) -> Result<(), DefinitionError> {
    if condition.description().trim().is_empty() {
        return Err(DefinitionError::EmptyDescription {
            target: function.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Checks {
    transforms: Arc<[Transform]>,
    preconditions: ContractStack,
    postconditions: ContractStack,
}

/// A callable wrapped in its contract.
#[derive(Clone)]
pub struct Contracted {
    function: Function,
    checks: Option<Checks>,
    config: ContractConfig,
}

impl Contracted {
    /// `false` if the contract was built with checks inactive.
    pub fn is_checked(&self) -> bool {
        self.checks.is_some()
    }

    pub fn preconditions(&self) -> Option<&ContractStack> {
        self.checks.as_ref().map(|c| &c.preconditions)
    }

    pub fn postconditions(&self) -> Option<&ContractStack> {
        self.checks.as_ref().map(|c| &c.postconditions)
    }

    /// The wrapped body, callable without any checks.
    pub fn unchecked(&self) -> &Function {
        &self.function
    }
}

impl Callable for Contracted {
    fn signature(&self) -> &Signature {
        self.function.signature()
    }

    fn call(&self, call: Call) -> Result<Value, ContractError> {
        let mut args = bind(self.function.signature(), call)?;
        let checks = match &self.checks {
            Some(checks) if self.config.is_active() => checks,
            _ => return self.function.invoke(&args),
        };

        for t in checks.transforms.iter() {
            args = t.apply(&args)?;
        }
        checks.preconditions.evaluate(Subject::Arguments(&args))?;
        let result = self.function.invoke(&args)?;
        checks
            .postconditions
            .evaluate(Subject::Result(&args, &result))?;
        Ok(result)
    }
}

impl fmt::Debug for Contracted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contracted")
            .field("function", &self.function)
            .field("checks", &self.checks)
            .finish()
    }
}
