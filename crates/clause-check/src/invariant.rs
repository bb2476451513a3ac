//! Class invariants and the guard installed around eligible methods.
//!
//! [`ClassBuilder`] is the definition-time pass over a class's method
//! table. When it builds, every eligible method is replaced by a
//! [`Guarded`] callable that evaluates the class invariants against the
//! receiving instance before the call and again after it returns.
//! Eligibility is decided once, here, from the method's [`MethodKind`]:
//!
//! | Method kind                         | Before | After |
//! |-------------------------------------|--------|-------|
//! | `Constructor`                       | no     | yes   |
//! | `Instance`                          | yes    | yes   |
//! | `Special`: arithmetic, comparison, container | yes | yes |
//! | `Special`: attribute access, lifecycle | no  | no    |
//! | `ClassLevel`                        | no     | no    |
//!
//! Methods added with [`ClassRef::define_method`] after the class is built
//! are never guarded. Nested calls on the same instance are checked at
//! every boundary; there is no reentrancy suppression.

use std::sync::Arc;

use clause_core::{
    Call, Callable, ClassRef, ContractError, DefinitionError, MethodEntry, MethodKey, MethodKind,
    ObjectRef, Signature, SignatureError, SpecialFamily, SpecialMethod, Truthy, Value,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::config::ContractConfig;
use crate::contracts::{Condition, ContractStack, Subject};

/// A class invariant over the receiving instance.
pub fn invariant<F, V>(description: impl Into<String>, predicate: F) -> Condition
where
    F: Fn(&ObjectRef) -> anyhow::Result<V> + Send + Sync + 'static,
    V: Truthy,
{
    Condition::invariant(description, predicate)
}

/// Where the guard checks invariants for one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPoints {
    BeforeAndAfter,
    AfterOnly,
}

/// Special methods that stay subject to invariant checks.
pub fn is_guarded_special(method: SpecialMethod) -> bool {
    matches!(
        method.family(),
        SpecialFamily::Arithmetic | SpecialFamily::Comparison | SpecialFamily::Container
    )
}

/// Where invariants are checked for a method of the given kind, or `None`
/// if the method is exempt.
pub fn guard_points(kind: MethodKind) -> Option<GuardPoints> {
    match kind {
        MethodKind::Constructor => Some(GuardPoints::AfterOnly),
        MethodKind::Instance => Some(GuardPoints::BeforeAndAfter),
        MethodKind::Special(m) if is_guarded_special(m) => Some(GuardPoints::BeforeAndAfter),
        MethodKind::Special(_) | MethodKind::ClassLevel => None,
    }
}

/// A method wrapped by the invariant guard.
pub struct Guarded {
    inner: Arc<dyn Callable>,
    invariants: ContractStack,
    points: GuardPoints,
    config: ContractConfig,
}

impl Guarded {
    pub fn new(inner: Arc<dyn Callable>, invariants: ContractStack, points: GuardPoints) -> Self {
        Guarded {
            inner,
            invariants,
            points,
            config: ContractConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    pub fn points(&self) -> GuardPoints {
        self.points
    }
}

impl Callable for Guarded {
    fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    fn call(&self, call: Call) -> Result<Value, ContractError> {
        if !self.config.is_active() {
            return self.inner.call(call);
        }
        let receiver = call
            .positional
            .first()
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| SignatureError::MissingReceiver {
                function: self.inner.name().to_string(),
            })?;

        if self.points == GuardPoints::BeforeAndAfter {
            self.invariants.evaluate(Subject::Instance(&receiver))?;
        }
        let result = self.inner.call(call)?;
        self.invariants.evaluate(Subject::Instance(&receiver))?;
        Ok(result)
    }
}

/// Definition of one class: attributes, methods and invariants.
pub struct ClassBuilder {
    name: String,
    attrs: IndexMap<String, Value>,
    methods: Vec<(MethodKey, MethodKind, Arc<dyn Callable>)>,
    invariants: Vec<Condition>,
    config: ContractConfig,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            attrs: IndexMap::new(),
            methods: Vec::new(),
            invariants: Vec::new(),
            config: ContractConfig::default(),
        }
    }

    /// A class-level attribute, readable through every instance.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn constructor(self, callable: impl Callable + 'static) -> Self {
        self.add(MethodKey::Constructor, MethodKind::Constructor, callable)
    }

    pub fn method(self, name: impl Into<String>, callable: impl Callable + 'static) -> Self {
        self.add(MethodKey::Named(name.into()), MethodKind::Instance, callable)
    }

    pub fn class_method(self, name: impl Into<String>, callable: impl Callable + 'static) -> Self {
        self.add(MethodKey::Named(name.into()), MethodKind::ClassLevel, callable)
    }

    pub fn special(self, method: SpecialMethod, callable: impl Callable + 'static) -> Self {
        self.add(MethodKey::Special(method), MethodKind::Special(method), callable)
    }

    fn add(mut self, key: MethodKey, kind: MethodKind, callable: impl Callable + 'static) -> Self {
        let callable: Arc<dyn Callable> = Arc::new(callable);
        self.methods.push((key, kind, callable));
        self
    }

    /// Appends an invariant after those already declared.
    pub fn invariant<F, V>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ObjectRef) -> anyhow::Result<V> + Send + Sync + 'static,
        V: Truthy,
    {
        self.invariants.push(invariant(description, predicate));
        self
    }

    /// Appends an already constructed invariant condition.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.invariants.push(condition);
        self
    }

    /// Overrides the process-wide toggle for this class.
    pub fn with_config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    /// Defines the class, installing guards in place of eligible methods.
    pub fn build(self) -> Result<ClassRef, DefinitionError> {
        for condition in &self.invariants {
            if condition.description().trim().is_empty() {
                return Err(DefinitionError::EmptyDescription {
                    target: self.name.clone(),
                });
            }
        }
        for (key, _, callable) in &self.methods {
            if callable.signature().receiver().is_none() {
                return Err(DefinitionError::MissingReceiver {
                    class: self.name.clone(),
                    method: key.to_string(),
                });
            }
        }

        let class = ClassRef::new(self.name.clone());
        for (name, value) in self.attrs {
            class.set_attr(name, value);
        }

        let active = self.config.is_active() && !self.invariants.is_empty();
        let invariants = ContractStack::new(self.name.clone(), self.invariants);
        let mut guarded = 0usize;
        for (key, kind, callable) in self.methods {
            let entry = match guard_points(kind) {
                Some(points) if active => {
                    guarded += 1;
                    MethodEntry {
                        kind,
                        callable: Arc::new(
                            Guarded::new(callable, invariants.clone(), points)
                                .with_config(self.config),
                        ),
                        guarded: true,
                    }
                }
                _ => MethodEntry {
                    kind,
                    callable,
                    guarded: false,
                },
            };
            class.install(key, entry)?;
        }

        debug!(
            class = %self.name,
            invariants = invariants.len(),
            methods = class.method_keys().len(),
            guarded,
            "class defined"
        );
        Ok(class)
    }
}
