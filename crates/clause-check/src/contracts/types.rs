//! Aggregate runtime type check over named parameters.

use indexmap::IndexMap;
use smallvec::SmallVec;

use clause_core::{Arguments, Kind, Value};

use super::condition::Condition;

/// Fixed description of every type-check condition.
pub const TYPES_DESCRIPTION: &str = "the types of arguments must be valid";

/// The kinds a parameter's value may have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    kinds: SmallVec<[Kind; 2]>,
}

impl TypeSpec {
    /// Exactly one acceptable kind.
    pub fn of(kind: Kind) -> Self {
        let mut kinds = SmallVec::new();
        kinds.push(kind);
        TypeSpec { kinds }
    }

    /// Any of the given kinds.
    pub fn any_of(kinds: impl IntoIterator<Item = Kind>) -> Self {
        TypeSpec {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Instances of the named class.
    ///
    /// Classes are matched by name, not identity: an instance of any class
    /// called `class` is accepted, including a distinct class that happens
    /// to share the name.
    pub fn instance_of(class: impl Into<String>) -> Self {
        TypeSpec::of(Kind::Instance(class.into()))
    }

    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }

    pub fn accepts(&self, value: &Value) -> bool {
        let kind = value.kind();
        self.kinds.iter().any(|k| *k == kind)
    }
}

impl From<Kind> for TypeSpec {
    fn from(kind: Kind) -> Self {
        TypeSpec::of(kind)
    }
}

impl<const N: usize> From<[Kind; N]> for TypeSpec {
    fn from(kinds: [Kind; N]) -> Self {
        TypeSpec::any_of(kinds)
    }
}

/// Per-parameter type requirements, compiled into one precondition.
#[derive(Debug, Clone, Default)]
pub struct TypeCheck {
    requirements: IndexMap<String, TypeSpec>,
}

impl TypeCheck {
    pub fn new<I, K, T>(requirements: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<TypeSpec>,
    {
        TypeCheck {
            requirements: requirements
                .into_iter()
                .map(|(k, t)| (k.into(), t.into()))
                .collect(),
        }
    }

    /// Names of the constrained parameters.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requirements.keys().map(String::as_str)
    }

    /// Returns `true` if every constrained parameter present in `args` has
    /// an acceptable kind. Parameters absent from the record are skipped.
    pub fn accepts(&self, args: &Arguments) -> bool {
        self.requirements.iter().all(|(name, spec)| {
            args.try_get(name)
                .map_or(true, |value| spec.accepts(value))
        })
    }

    /// The single precondition this check stands for.
    pub fn into_condition(self) -> Condition {
        Condition::type_check(TYPES_DESCRIPTION, move |args| Ok(self.accepts(args)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clause_core::{ClassRef, ContractKind, ObjectRef};

    use crate::contracts::condition::Subject;

    #[test]
    fn unconstrained_parameters_accept_anything() {
        let check = TypeCheck::new([("a", Kind::Int)]);
        let args = Arguments::from_fields("f", [("a", Value::Int(1)), ("b", Value::Float(2.5))]);
        assert!(check.accepts(&args));
    }

    #[test]
    fn alternatives_and_instances() {
        let example = ClassRef::new("ExampleClass");
        let check = TypeCheck::new([(
            "c",
            TypeSpec::any_of([Kind::None, Kind::Instance("ExampleClass".into())]),
        )]);

        let with_instance = Arguments::from_fields(
            "f",
            [("c", Value::Object(ObjectRef::new(example.clone())))],
        );
        assert!(check.accepts(&with_instance));
        assert!(check.accepts(&Arguments::from_fields("f", [("c", Value::None)])));

        // The class itself is not an instance of it.
        let with_class = Arguments::from_fields("f", [("c", Value::Class(example))]);
        assert!(!check.accepts(&with_class));
    }

    #[test]
    fn instances_match_by_class_name() {
        let spec = TypeSpec::instance_of("Point");
        let first = ObjectRef::new(ClassRef::new("Point"));
        let other = ObjectRef::new(ClassRef::new("Point"));
        assert!(!first.class().ptr_eq(other.class()));
        assert!(spec.accepts(&Value::Object(first)));
        assert!(spec.accepts(&Value::Object(other)));
        assert!(!spec.accepts(&Value::Object(ObjectRef::new(ClassRef::new("Line")))));
    }

    #[test]
    fn bool_is_not_int() {
        assert!(!TypeSpec::of(Kind::Int).accepts(&Value::Bool(true)));
        assert!(TypeSpec::from([Kind::Int, Kind::Bool]).accepts(&Value::Bool(true)));
    }

    #[test]
    fn compiles_to_one_type_check_condition() {
        let condition = TypeCheck::new([("a", Kind::Int), ("b", Kind::Str)]).into_condition();
        assert_eq!(condition.kind(), ContractKind::TypeCheck);
        assert_eq!(condition.description(), TYPES_DESCRIPTION);
        let bad = Arguments::from_fields("f", [("a", Value::Int(1)), ("b", Value::Int(2))]);
        assert!(!condition.holds(Subject::Arguments(&bad)).unwrap());
    }
}
