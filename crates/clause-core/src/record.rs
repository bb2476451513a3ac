//! The argument record: one call's arguments, by parameter name.
//!
//! Records are immutable. [`rewrite`] is the only way to change a field, and
//! it returns a new record.

use indexmap::IndexMap;

use crate::error::RecordError;
use crate::object::ObjectRef;
use crate::signature::SELF_PARAM;
use crate::value::Value;

/// Bound arguments of a single call.
///
/// Fields are the declared parameters in declaration order, followed by the
/// variadic slot (a list) and the keyword slot (a map) when the signature
/// declares them.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    function: String,
    fields: IndexMap<String, Value>,
    variadic: Option<String>,
    variadic_keywords: Option<String>,
}

impl Arguments {
    pub(crate) fn new(
        function: &str,
        fields: IndexMap<String, Value>,
        variadic: Option<&str>,
        variadic_keywords: Option<&str>,
    ) -> Self {
        Arguments {
            function: function.to_string(),
            fields,
            variadic: variadic.map(str::to_string),
            variadic_keywords: variadic_keywords.map(str::to_string),
        }
    }

    /// Builds a record directly from named values, without variadic slots.
    pub fn from_fields<I, K, V>(function: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Arguments {
            function: function.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            variadic: None,
            variadic_keywords: None,
        }
    }

    /// Name of the callable these arguments were bound for.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Returns the named field, or [`RecordError::UnknownField`].
    pub fn get(&self, name: &str) -> Result<&Value, RecordError> {
        self.fields.get(name).ok_or_else(|| RecordError::UnknownField {
            function: self.function.clone(),
            name: name.to_string(),
        })
    }

    pub fn try_get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The instance a method was invoked on (the `self` field).
    pub fn receiver(&self) -> Result<&ObjectRef, RecordError> {
        self.fields
            .get(SELF_PARAM)
            .and_then(Value::as_object)
            .ok_or_else(|| RecordError::MissingReceiver {
                function: self.function.clone(),
            })
    }

    /// Excess positional arguments; empty if the signature has no variadic slot.
    pub fn extra_positional(&self) -> &[Value] {
        self.variadic
            .as_deref()
            .and_then(|name| self.fields.get(name))
            .and_then(Value::as_list)
            .unwrap_or(&[])
    }

    /// Unmatched keyword arguments, if the signature has a keyword slot.
    pub fn extra_keywords(&self) -> Option<&IndexMap<String, Value>> {
        self.variadic_keywords
            .as_deref()
            .and_then(|name| self.fields.get(name))
            .and_then(Value::as_map)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a copy of this record with the named fields replaced.
    ///
    /// Every override must name an existing field; the first one that does
    /// not yields [`RecordError::UnknownField`] and no record is produced.
    pub fn rewrite<I, K, V>(&self, overrides: I) -> Result<Arguments, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut next = self.clone();
        for (name, value) in overrides {
            let name = name.into();
            match next.fields.get_mut(&name) {
                Some(slot) => *slot = value.into(),
                None => {
                    return Err(RecordError::UnknownField {
                        function: self.function.clone(),
                        name,
                    })
                }
            }
        }
        Ok(next)
    }
}

/// Builds a replacement record: every field of `record` copied, except the
/// named overrides.
pub fn rewrite<I, K, V>(record: &Arguments, overrides: I) -> Result<Arguments, RecordError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    record.rewrite(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Stream;

    #[test]
    fn rewrite_copies_and_overrides() {
        let record = Arguments::from_fields("f", [("a", Value::Int(1)), ("b", Value::from("x"))]);
        let next = rewrite(&record, [("b", "y")]).unwrap();
        assert_eq!(next.get("a").unwrap(), &Value::Int(1));
        assert_eq!(next.get("b").unwrap(), &Value::from("y"));
        // The original record is untouched.
        assert_eq!(record.get("b").unwrap(), &Value::from("x"));
        let names: Vec<&str> = next.names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn rewrite_of_unknown_field_fails() {
        let record = Arguments::from_fields("f", [("a", 1)]);
        let err = record.rewrite([("z", 2)]).unwrap_err();
        assert_eq!(err.to_string(), "argument record of f has no field 'z'");
    }

    #[test]
    fn rewrite_can_materialize_a_stream() {
        let stream = Stream::new((1..4).map(Value::Int));
        let record = Arguments::from_fields("my_func", [("l", Value::Stream(stream))]);
        let realized = record.get("l").unwrap().elements().unwrap();
        let next = record.rewrite([("l", realized)]).unwrap();
        assert_eq!(
            next.get("l").unwrap(),
            &Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn missing_receiver() {
        let record = Arguments::from_fields("get", [("i", 0)]);
        assert!(matches!(
            record.receiver(),
            Err(RecordError::MissingReceiver { .. })
        ));
        assert!(record.extra_positional().is_empty());
        assert!(record.extra_keywords().is_none());
    }
}
