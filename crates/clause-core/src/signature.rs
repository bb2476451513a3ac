//! Declared parameter shape of a callable.
//!
//! A [`Signature`] is the statically available descriptor the binder reads:
//! ordered parameter names, their defaults, which of them are keyword-only,
//! and the optional variadic slots that collect excess positional and
//! keyword arguments.

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::value::Value;

/// Receiver parameter name for instance methods.
pub const SELF_PARAM: &str = "self";
/// Receiver parameter name for class-level methods.
pub const CLS_PARAM: &str = "cls";

/// How a parameter may be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    /// Filled by position or by name.
    PositionalOrKeyword,
    /// Filled by name only.
    KeywordOnly,
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    /// Value used when the call supplies none. `None` means required.
    pub default: Option<Value>,
}

impl Param {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Declared parameter shape of one callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
    variadic: Option<String>,
    variadic_keywords: Option<String>,
    receiver: bool,
}

impl Signature {
    /// A free function with no parameters yet.
    pub fn new(name: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            params: Vec::new(),
            variadic: None,
            variadic_keywords: None,
            receiver: false,
        }
    }

    /// An instance method: the first parameter is the receiver, `self`.
    pub fn method(name: impl Into<String>) -> Self {
        let mut sig = Signature::new(name).param(SELF_PARAM);
        sig.receiver = true;
        sig
    }

    /// A class-level method: the first parameter is the class, `cls`.
    pub fn class_method(name: impl Into<String>) -> Self {
        let mut sig = Signature::new(name).param(CLS_PARAM);
        sig.receiver = true;
        sig
    }

    /// Appends a required positional-or-keyword parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            default: None,
        });
        self
    }

    /// Appends a positional-or-keyword parameter with a default.
    pub fn param_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            default: Some(default.into()),
        });
        self
    }

    /// Appends a required keyword-only parameter.
    pub fn keyword_only(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::KeywordOnly,
            default: None,
        });
        self
    }

    /// Appends a keyword-only parameter with a default.
    pub fn keyword_only_default(
        mut self,
        name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::KeywordOnly,
            default: Some(default.into()),
        });
        self
    }

    /// Declares the slot collecting excess positional arguments as a list.
    pub fn variadic(mut self, name: impl Into<String>) -> Self {
        self.variadic = Some(name.into());
        self
    }

    /// Declares the slot collecting unmatched keyword arguments as a map.
    pub fn variadic_keywords(mut self, name: impl Into<String>) -> Self {
        self.variadic_keywords = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn variadic_name(&self) -> Option<&str> {
        self.variadic.as_deref()
    }

    pub fn variadic_keywords_name(&self) -> Option<&str> {
        self.variadic_keywords.as_deref()
    }

    /// Name of the receiver parameter, for method signatures.
    pub fn receiver(&self) -> Option<&str> {
        if self.receiver {
            self.params.first().map(|p| p.name.as_str())
        } else {
            None
        }
    }

    /// Parameters that can be filled positionally, in declaration order.
    pub fn positional(&self) -> impl Iterator<Item = &Param> {
        self.params
            .iter()
            .filter(|p| p.kind == ParamKind::PositionalOrKeyword)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Every field name an argument record bound against this signature has.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.variadic.as_deref())
            .chain(self.variadic_keywords.as_deref())
    }

    /// Returns `true` if a bound record will carry a field named `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.field_names().any(|n| n == name)
    }

    /// Checks the declaration itself: unique names, and no required
    /// positional parameter after one with a default.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let names: Vec<&str> = self.field_names().collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(DefinitionError::DuplicateParameter {
                    function: self.name.clone(),
                    name: name.to_string(),
                });
            }
        }

        let mut seen_default = false;
        for param in self.positional() {
            if param.default.is_some() {
                seen_default = true;
            } else if seen_default {
                return Err(DefinitionError::RequiredAfterDefault {
                    function: self.name.clone(),
                    name: param.name.clone(),
                });
            }
        }
        Ok(())
    }
}
