//! Argument binding: maps a [`Call`] onto a [`Signature`].
//!
//! Positional values fill positional parameters in declaration order, then
//! keyword values fill parameters by name, then defaults fill whatever is
//! still empty. Excess positional values go to the variadic slot and
//! unmatched keywords to the keyword slot. Anything that cannot be placed,
//! and any required parameter left empty, is a [`SignatureError`].

use indexmap::IndexMap;

use crate::call::Call;
use crate::error::SignatureError;
use crate::record::Arguments;
use crate::signature::{ParamKind, Signature};
use crate::value::Value;

/// Binds `call` against `signature`, producing the argument record.
pub fn bind(signature: &Signature, call: Call) -> Result<Arguments, SignatureError> {
    let function = signature.name();
    let params = signature.params();
    let mut slots: Vec<Option<Value>> = vec![None; params.len()];

    // Positional values, in order, onto positional-or-keyword params.
    let positional_indices: Vec<usize> = params
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == ParamKind::PositionalOrKeyword)
        .map(|(i, _)| i)
        .collect();

    let given = call.positional.len();
    let mut values = call.positional.into_iter();
    for &index in &positional_indices {
        match values.next() {
            Some(value) => slots[index] = Some(value),
            None => break,
        }
    }
    let extra_positional: Vec<Value> = values.collect();
    if !extra_positional.is_empty() && signature.variadic_name().is_none() {
        return Err(SignatureError::TooManyPositional {
            function: function.to_string(),
            expected: positional_indices.len(),
            given,
        });
    }

    // Keywords, by name.
    let mut extra_keywords: IndexMap<String, Value> = IndexMap::new();
    for (name, value) in call.keywords {
        match signature.index_of(&name) {
            Some(index) if slots[index].is_some() => {
                return Err(SignatureError::MultipleValues {
                    function: function.to_string(),
                    name,
                });
            }
            Some(index) => slots[index] = Some(value),
            None if signature.variadic_keywords_name().is_some() => {
                extra_keywords.insert(name, value);
            }
            None => {
                return Err(SignatureError::UnexpectedKeyword {
                    function: function.to_string(),
                    name,
                });
            }
        }
    }

    // Defaults, then the required check, in declaration order.
    let mut fields: IndexMap<String, Value> = IndexMap::with_capacity(params.len() + 2);
    for (param, slot) in params.iter().zip(slots) {
        let value = match slot.or_else(|| param.default.clone()) {
            Some(value) => value,
            None => {
                return Err(SignatureError::MissingArgument {
                    function: function.to_string(),
                    name: param.name.clone(),
                });
            }
        };
        fields.insert(param.name.clone(), value);
    }

    if let Some(name) = signature.variadic_name() {
        fields.insert(name.to_string(), Value::List(extra_positional));
    }
    if let Some(name) = signature.variadic_keywords_name() {
        fields.insert(name.to_string(), Value::Map(extra_keywords));
    }

    Ok(Arguments::new(
        function,
        fields,
        signature.variadic_name(),
        signature.variadic_keywords_name(),
    ))
}
