//! One concrete invocation's actual arguments.

use indexmap::IndexMap;

use crate::value::Value;

/// Actual arguments of a single call: positional values in order plus
/// keyword values in the order they were written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    pub positional: Vec<Value>,
    pub keywords: IndexMap<String, Value>,
}

impl Call {
    pub fn new() -> Self {
        Call::default()
    }

    /// A call with the given positional values and no keywords.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Call {
            positional: values.into_iter().map(Into::into).collect(),
            keywords: IndexMap::new(),
        }
    }

    /// Appends a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Adds (or replaces) a keyword value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// Expands a mapping into keyword values.
    pub fn kwargs<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.keywords
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Prepends a receiver (instance or class) as the first positional value.
    pub fn with_receiver(mut self, receiver: impl Into<Value>) -> Self {
        self.positional.insert(0, receiver.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}
