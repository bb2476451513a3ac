//! Instances, classes and method dispatch.
//!
//! A [`ClassRef`] owns class-level attributes and a method table. Method
//! table entries are [`Callable`] values; the checking layer installs
//! guarded callables there when a class is defined, so dispatch itself has
//! no knowledge of contracts.
//!
//! An [`ObjectRef`] is an instance: its own fields plus a reference to its
//! class. Attribute reads fall back from instance fields to class attributes.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::call::Call;
use crate::error::{ContractError, DefinitionError, SignatureError, ValueError};
use crate::signature::Signature;
use crate::value::Value;

/// Anything that can be invoked with a [`Call`].
pub trait Callable: Send + Sync {
    fn signature(&self) -> &Signature;

    fn call(&self, call: Call) -> Result<Value, ContractError>;

    fn name(&self) -> &str {
        self.signature().name()
    }
}

/// Operator, container and hook methods a class may define.
///
/// Dispatched through [`ObjectRef::call_special`], never by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialMethod {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Container emulation
    Len,
    GetItem,
    SetItem,
    DelItem,
    Contains,
    Iter,
    // Attribute access hooks
    GetAttr,
    SetAttr,
    DelAttr,
    // Representation and lifecycle
    Repr,
    Str,
    Hash,
    Drop,
}

/// Grouping of [`SpecialMethod`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialFamily {
    Arithmetic,
    Comparison,
    Container,
    AttributeAccess,
    Lifecycle,
}

impl SpecialMethod {
    pub fn family(self) -> SpecialFamily {
        use SpecialMethod::*;
        match self {
            Add | Sub | Mul | Div | Rem | Neg => SpecialFamily::Arithmetic,
            Eq | Ne | Lt | Le | Gt | Ge => SpecialFamily::Comparison,
            Len | GetItem | SetItem | DelItem | Contains | Iter => SpecialFamily::Container,
            GetAttr | SetAttr | DelAttr => SpecialFamily::AttributeAccess,
            Repr | Str | Hash | Drop => SpecialFamily::Lifecycle,
        }
    }

    pub fn name(self) -> &'static str {
        use SpecialMethod::*;
        match self {
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Rem => "rem",
            Neg => "neg",
            Eq => "eq",
            Ne => "ne",
            Lt => "lt",
            Le => "le",
            Gt => "gt",
            Ge => "ge",
            Len => "len",
            GetItem => "get_item",
            SetItem => "set_item",
            DelItem => "del_item",
            Contains => "contains",
            Iter => "iter",
            GetAttr => "get_attr",
            SetAttr => "set_attr",
            DelAttr => "del_attr",
            Repr => "repr",
            Str => "str",
            Hash => "hash",
            Drop => "drop",
        }
    }
}

/// What role a method plays in its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    /// Initializes a freshly created instance.
    Constructor,
    /// An ordinary instance method.
    Instance,
    /// Receives the class rather than an instance.
    ClassLevel,
    Special(SpecialMethod),
}

/// Key of a method table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    Constructor,
    Named(String),
    Special(SpecialMethod),
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKey::Constructor => f.write_str("<constructor>"),
            MethodKey::Named(name) => f.write_str(name),
            MethodKey::Special(m) => write!(f, "<{}>", m.name()),
        }
    }
}

/// One method table entry.
#[derive(Clone)]
pub struct MethodEntry {
    pub kind: MethodKind,
    pub callable: Arc<dyn Callable>,
    /// `true` if `callable` is an invariant guard installed at definition time.
    pub guarded: bool,
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("kind", &self.kind)
            .field("callable", &self.callable.name())
            .field("guarded", &self.guarded)
            .finish()
    }
}

struct ClassData {
    name: String,
    attrs: RwLock<IndexMap<String, Value>>,
    methods: RwLock<IndexMap<MethodKey, MethodEntry>>,
}

/// Shared handle to a class. Clones refer to the same class.
#[derive(Clone)]
pub struct ClassRef(Arc<ClassData>);

impl ClassRef {
    /// An empty class: no attributes, no methods.
    pub fn new(name: impl Into<String>) -> Self {
        ClassRef(Arc::new(ClassData {
            name: name.into(),
            attrs: RwLock::new(IndexMap::new()),
            methods: RwLock::new(IndexMap::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ptr_eq(&self, other: &ClassRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Reads a class-level attribute.
    pub fn attr(&self, name: &str) -> Option<Value> {
        self.0.attrs.read().get(name).cloned()
    }

    /// Writes a class-level attribute, visible to every instance that has
    /// no field of the same name.
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.attrs.write().insert(name.into(), value.into());
    }

    /// Installs a method table entry. Used by the class definition pass.
    pub fn install(&self, key: MethodKey, entry: MethodEntry) -> Result<(), DefinitionError> {
        let mut methods = self.0.methods.write();
        if methods.contains_key(&key) {
            return Err(DefinitionError::DuplicateMethod {
                class: self.0.name.clone(),
                method: key.to_string(),
            });
        }
        methods.insert(key, entry);
        Ok(())
    }

    /// Adds a method after the class has been defined.
    ///
    /// The callable is installed as-is. Invariant guards are only ever
    /// installed at definition time, so methods added here are never guarded.
    pub fn define_method(
        &self,
        key: MethodKey,
        kind: MethodKind,
        callable: Arc<dyn Callable>,
    ) -> Result<(), DefinitionError> {
        self.install(
            key,
            MethodEntry {
                kind,
                callable,
                guarded: false,
            },
        )
    }

    pub fn method(&self, key: &MethodKey) -> Option<MethodEntry> {
        self.0.methods.read().get(key).cloned()
    }

    /// Returns `true` if the entry under `key` is an installed invariant guard.
    pub fn is_guarded(&self, key: &MethodKey) -> bool {
        self.0
            .methods
            .read()
            .get(key)
            .is_some_and(|entry| entry.guarded)
    }

    pub fn method_keys(&self) -> Vec<MethodKey> {
        self.0.methods.read().keys().cloned().collect()
    }

    /// Creates an instance and runs the constructor, if any, on it.
    pub fn instantiate(&self, call: Call) -> Result<ObjectRef, ContractError> {
        let obj = ObjectRef::new(self.clone());
        match self.method(&MethodKey::Constructor) {
            Some(entry) => {
                entry
                    .callable
                    .call(call.with_receiver(Value::Object(obj.clone())))?;
            }
            None if !call.is_empty() => {
                return Err(SignatureError::TooManyPositional {
                    function: self.0.name.clone(),
                    expected: 0,
                    given: call.positional.len() + call.keywords.len(),
                }
                .into());
            }
            None => {}
        }
        Ok(obj)
    }

    /// Invokes a class-level method without an instance.
    pub fn call_class(&self, name: &str, call: Call) -> Result<Value, ContractError> {
        let key = MethodKey::Named(name.to_string());
        match self.method(&key) {
            Some(entry) if entry.kind == MethodKind::ClassLevel => entry
                .callable
                .call(call.with_receiver(Value::Class(self.clone()))),
            _ => Err(SignatureError::UnknownMethod {
                class: self.0.name.clone(),
                method: name.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.0.name)
            .field("methods", &self.0.methods.read().len())
            .finish()
    }
}

struct ObjectData {
    class: ClassRef,
    fields: RwLock<IndexMap<String, Value>>,
}

/// Shared handle to an instance. Clones refer to the same instance.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
    /// A bare instance with no fields. Use [`ClassRef::instantiate`] to run
    /// the constructor.
    pub fn new(class: ClassRef) -> Self {
        ObjectRef(Arc::new(ObjectData {
            class,
            fields: RwLock::new(IndexMap::new()),
        }))
    }

    pub fn class(&self) -> &ClassRef {
        &self.0.class
    }

    pub fn class_name(&self) -> &str {
        self.0.class.name()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Reads an attribute: the instance field, else the class attribute.
    pub fn get(&self, name: &str) -> Result<Value, ValueError> {
        self.try_get(name).ok_or_else(|| ValueError::MissingAttribute {
            class: self.class_name().to_string(),
            name: name.to_string(),
        })
    }

    pub fn try_get(&self, name: &str) -> Option<Value> {
        let own = self.0.fields.read().get(name).cloned();
        own.or_else(|| self.0.class.attr(name))
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.fields.write().insert(name.into(), value.into());
    }

    /// Mutates an instance field in place.
    ///
    /// The field lock is held while `f` runs; `f` must not call back into
    /// this instance.
    pub fn update<R>(&self, name: &str, f: impl FnOnce(&mut Value) -> R) -> Result<R, ValueError> {
        let mut fields = self.0.fields.write();
        match fields.get_mut(name) {
            Some(value) => Ok(f(value)),
            None => Err(ValueError::MissingAttribute {
                class: self.class_name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Names of the instance's own fields.
    pub fn field_names(&self) -> Vec<String> {
        self.0.fields.read().keys().cloned().collect()
    }

    /// Invokes a named method with this instance (or, for class-level
    /// methods, its class) as receiver.
    pub fn call(&self, name: &str, call: Call) -> Result<Value, ContractError> {
        self.dispatch(MethodKey::Named(name.to_string()), call)
    }

    /// Invokes a special method with this instance as receiver.
    pub fn call_special(&self, method: SpecialMethod, call: Call) -> Result<Value, ContractError> {
        self.dispatch(MethodKey::Special(method), call)
    }

    fn dispatch(&self, key: MethodKey, call: Call) -> Result<Value, ContractError> {
        let entry = match self.0.class.method(&key) {
            Some(entry) if key != MethodKey::Constructor => entry,
            _ => {
                return Err(SignatureError::UnknownMethod {
                    class: self.class_name().to_string(),
                    method: key.to_string(),
                }
                .into())
            }
        };
        let receiver = match entry.kind {
            MethodKind::ClassLevel => Value::Class(self.0.class.clone()),
            _ => Value::Object(self.clone()),
        };
        entry.callable.call(call.with_receiver(receiver))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field values may refer back to this instance; list names only.
        f.debug_struct("Object")
            .field("class", &self.class_name())
            .field("fields", &self.field_names())
            .finish()
    }
}
