//! Runtime value representation observed by contract predicates.
//!
//! [`Value`] is the dynamic counterpart to a callable's declared
//! [`Signature`](crate::signature::Signature): every argument, every result
//! and every instance field is a `Value`. [`Kind`] is its runtime type tag,
//! which is what the aggregate type check compares against.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::object::{ClassRef, ObjectRef};

/// Runtime type tag of a [`Value`].
///
/// `Bool` is its own kind; a boolean is never accepted where an `Int` is
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    None,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    Stream,
    /// A class value (the class itself, not one of its instances).
    Class,
    /// An instance of the named class.
    Instance(String),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::None => f.write_str("none"),
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("int"),
            Kind::Float => f.write_str("float"),
            Kind::Str => f.write_str("str"),
            Kind::List => f.write_str("list"),
            Kind::Map => f.write_str("map"),
            Kind::Stream => f.write_str("stream"),
            Kind::Class => f.write_str("class"),
            Kind::Instance(name) => f.write_str(name),
        }
    }
}

/// A one-shot lazy sequence.
///
/// Clones share the underlying iterator: an element read through any clone
/// is gone for all of them. This is the hazard the transform facility exists
/// for.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<Mutex<Box<dyn Iterator<Item = Value> + Send>>>,
}

impl Stream {
    /// Wraps `iter` as a shared one-shot stream.
    ///
    /// Reads hold the stream's lock while pulling from `iter`, so `iter`
    /// must not read from the same stream (directly or through a clone);
    /// doing so deadlocks.
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Stream {
            inner: Arc::new(Mutex::new(Box::new(iter.into_iter()))),
        }
    }

    /// Consumes and returns the next element.
    pub fn next(&self) -> Option<Value> {
        self.inner.lock().next()
    }

    /// Consumes up to `n` elements.
    pub fn take(&self, n: usize) -> Vec<Value> {
        self.inner.lock().by_ref().take(n).collect()
    }

    /// Consumes every remaining element. Never returns on an unbounded
    /// stream; use [`Stream::take`] to realize a prefix instead.
    pub fn drain(&self) -> Vec<Value> {
        self.inner.lock().by_ref().collect()
    }

    /// Returns `true` if both handles share one underlying iterator.
    pub fn ptr_eq(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stream(..)")
    }
}

/// A dynamic runtime value.
///
/// Scalars, strings, lists and maps compare structurally. Streams, objects
/// and classes compare by identity.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Keyed values in insertion order.
    Map(IndexMap<String, Value>),
    Stream(Stream),
    Object(ObjectRef),
    Class(ClassRef),
}

impl Value {
    /// Returns the runtime kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::None => Kind::None,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Stream(_) => Kind::Stream,
            Value::Object(obj) => Kind::Instance(obj.class_name().to_string()),
            Value::Class(_) => Kind::Class,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    fn mismatch(&self, expected: Kind) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            got: self.kind(),
        }
    }

    pub fn expect_int(&self) -> Result<i64, ValueError> {
        self.as_int().ok_or_else(|| self.mismatch(Kind::Int))
    }

    pub fn expect_str(&self) -> Result<&str, ValueError> {
        self.as_str().ok_or_else(|| self.mismatch(Kind::Str))
    }

    pub fn expect_list(&self) -> Result<&[Value], ValueError> {
        self.as_list().ok_or_else(|| self.mismatch(Kind::List))
    }

    pub fn expect_object(&self) -> Result<&ObjectRef, ValueError> {
        self.as_object()
            .ok_or_else(|| self.mismatch(Kind::Instance("object".into())))
    }

    pub fn expect_class(&self) -> Result<&ClassRef, ValueError> {
        self.as_class().ok_or_else(|| self.mismatch(Kind::Class))
    }

    /// Returns the elements of an iterable value.
    ///
    /// Lists are copied. Streams are drained, so every other holder of the
    /// same stream observes it exhausted afterwards. Maps yield their keys.
    pub fn elements(&self) -> Result<Vec<Value>, ValueError> {
        match self {
            Value::List(items) => Ok(items.clone()),
            Value::Map(map) => Ok(map.keys().cloned().map(Value::Str).collect()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Stream(stream) => Ok(stream.drain()),
            other => Err(ValueError::NotIterable { kind: other.kind() }),
        }
    }

    /// Number of elements (characters for strings). Streams have no length.
    pub fn len(&self) -> Result<usize, ValueError> {
        match self {
            Value::Str(s) => Ok(s.chars().count()),
            Value::List(items) => Ok(items.len()),
            Value::Map(map) => Ok(map.len()),
            other => Err(ValueError::Unsized { kind: other.kind() }),
        }
    }

    /// Boolean coercion: `None`, `false`, zero, and empty strings, lists and
    /// maps are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Stream(_) | Value::Object(_) | Value::Class(_) => true,
        }
    }

    /// Renders the value as JSON for reports.
    ///
    /// Streams are not consumed; objects and classes render as their class name.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::None => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(x) => serde_json::Number::from_f64(*x)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Stream(_) => Json::String("<stream>".into()),
            Value::Object(obj) => Json::String(format!("<{} object>", obj.class_name())),
            Value::Class(class) => Json::String(format!("<class {}>", class.name())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Stream(_) => f.write_str("<stream>"),
            Value::Object(obj) => write!(f, "<{} object>", obj.class_name()),
            Value::Class(class) => write!(f, "<class {}>", class.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Stream> for Value {
    fn from(stream: Stream) -> Self {
        Value::Stream(stream)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<ClassRef> for Value {
    fn from(class: ClassRef) -> Self {
        Value::Class(class)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

/// Normalization of a predicate's return value to pass/fail.
pub trait Truthy {
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

impl Truthy for Value {
    fn truthy(&self) -> bool {
        self.is_truthy()
    }
}

impl Truthy for i64 {
    fn truthy(&self) -> bool {
        *self != 0
    }
}
