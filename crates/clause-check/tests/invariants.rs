//! Class invariants and which methods they guard.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clause_check::prelude::*;
use clause_core::{MethodKey, MethodKind};

use common::{checks_on, violation_message};

fn inner_list(obj: &ObjectRef) -> anyhow::Result<Vec<Value>> {
    Ok(obj.get("inner")?.expect_list()?.to_vec())
}

fn nonempty_list() -> ClassRef {
    ClassBuilder::new("NonemptyList")
        .invariant("inner list can never be empty", |obj: &ObjectRef| {
            Ok(!inner_list(obj)?.is_empty())
        })
        .invariant(
            "inner list must consist only of integers",
            |obj: &ObjectRef| Ok(inner_list(obj)?.iter().all(Value::is_int)),
        )
        .constructor(Function::new(
            Signature::method("NonemptyList").param("initial"),
            |a| {
                let initial = a.get("initial")?.elements()?;
                a.receiver()?.set("inner", initial);
                Ok(Value::None)
            },
        ))
        .method(
            "pop",
            Function::new(Signature::method("pop"), |a| {
                let popped = a
                    .receiver()?
                    .update("inner", |inner| inner.as_list_mut().and_then(Vec::pop))?;
                Ok(Value::from(popped))
            }),
        )
        .special(
            SpecialMethod::Len,
            Function::new(Signature::method("len"), |a| {
                Ok(Value::Int(inner_list(a.receiver()?)?.len() as i64))
            }),
        )
        .build()
        .unwrap()
}

#[test]
fn violated_after_the_mutating_call() {
    checks_on();
    let list = nonempty_list()
        .instantiate(Call::positional([Value::from(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
        ])]))
        .unwrap();

    assert_eq!(list.call("pop", Call::new()).unwrap(), Value::Int(3));
    assert_eq!(list.call("pop", Call::new()).unwrap(), Value::Int(2));
    let err = list.call("pop", Call::new()).unwrap_err();
    let violation = err.violation().unwrap();
    assert_eq!(violation.kind, ContractKind::Invariant);
    assert_eq!(violation.callable, "NonemptyList");
    assert_eq!(violation.description, "inner list can never be empty");

    // The instance is left broken; the next call fails before running.
    let err = list.call_special(SpecialMethod::Len, Call::new()).unwrap_err();
    assert_eq!(violation_message(err), "inner list can never be empty");
}

#[test]
fn constructor_result_is_checked() {
    checks_on();
    let err = nonempty_list()
        .instantiate(Call::positional([Value::from(vec![
            Value::from("a"),
            Value::from("b"),
            Value::from("c"),
        ])]))
        .unwrap_err();
    assert_eq!(
        violation_message(err),
        "inner list must consist only of integers"
    );
}

#[test]
fn constructor_is_not_checked_before_it_runs() {
    checks_on();
    // A bare instance has no `inner` field, so a before-check would fault.
    let list = nonempty_list()
        .instantiate(Call::positional([Value::from(vec![Value::Int(5)])]))
        .unwrap();
    assert_eq!(
        list.call_special(SpecialMethod::Len, Call::new()).unwrap(),
        Value::Int(1)
    );
}

#[test]
fn class_level_methods_are_unguarded_but_break_later_calls() {
    checks_on();
    let foo = ClassBuilder::new("Foo")
        .attr("always", true)
        .invariant("`always` should be True", |obj: &ObjectRef| {
            Ok(obj.get("always")?.as_bool() == Some(true))
        })
        .class_method(
            "break_everything",
            Function::new(Signature::class_method("break_everything"), |a| {
                a.get("cls")?.expect_class()?.set_attr("always", false);
                Ok(Value::None)
            }),
        )
        .method(
            "get_always",
            Function::new(Signature::method("get_always"), |a| {
                Ok(a.receiver()?.get("always")?)
            }),
        )
        .build()
        .unwrap();

    let obj = foo.instantiate(Call::new()).unwrap();
    assert_eq!(obj.call("get_always", Call::new()).unwrap(), Value::Bool(true));
    assert!(!foo.is_guarded(&MethodKey::Named("break_everything".into())));

    foo.call_class("break_everything", Call::new()).unwrap();
    let err = obj.call("get_always", Call::new()).unwrap_err();
    assert_eq!(violation_message(err), "`always` should be True");
}

#[test]
fn nested_calls_are_checked_at_every_boundary() {
    checks_on();
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = evaluations.clone();

    let class = ClassBuilder::new("Wrapper")
        .invariant("value is set", move |obj: &ObjectRef| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(obj.try_get("value").is_some())
        })
        .constructor(Function::new(
            Signature::method("Wrapper").param("value"),
            |a| {
                a.receiver()?.set("value", a.get("value")?.clone());
                Ok(Value::None)
            },
        ))
        .method(
            "get",
            Function::new(Signature::method("get"), |a| Ok(a.receiver()?.get("value")?)),
        )
        .method(
            "as_string",
            Function::new(Signature::method("as_string"), |a| {
                let value = a.receiver()?.call("get", Call::new())?;
                Ok(Value::from(value.to_string()))
            }),
        )
        .build()
        .unwrap();

    let obj = class.instantiate(Call::positional([12])).unwrap();
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);

    evaluations.store(0, Ordering::SeqCst);
    assert_eq!(obj.call("as_string", Call::new()).unwrap(), Value::from("12"));
    // Before and after both the outer and the inner call.
    assert_eq!(evaluations.load(Ordering::SeqCst), 4);
}

#[test]
fn exempt_and_late_methods_skip_the_guard() {
    checks_on();
    let class = ClassBuilder::new("Box")
        .invariant("`ok` holds", |obj: &ObjectRef| {
            Ok(obj.get("ok")?.as_bool() == Some(true))
        })
        .constructor(Function::new(Signature::method("Box"), |a| {
            a.receiver()?.set("ok", true);
            Ok(Value::None)
        }))
        .method(
            "spoil",
            Function::new(Signature::method("spoil"), |a| {
                a.receiver()?.set("ok", false);
                Ok(Value::None)
            }),
        )
        .special(
            SpecialMethod::GetAttr,
            Function::new(Signature::method("getattr").param("name"), |a| {
                Ok(a.receiver()?.get(a.get("name")?.expect_str()?)?)
            }),
        )
        .special(
            SpecialMethod::GetItem,
            Function::new(Signature::method("getitem").param("key"), |a| {
                Ok(a.receiver()?.get(a.get("key")?.expect_str()?)?)
            }),
        )
        .build()
        .unwrap();

    assert!(class.is_guarded(&MethodKey::Named("spoil".into())));
    assert!(class.is_guarded(&MethodKey::Special(SpecialMethod::GetItem)));
    assert!(!class.is_guarded(&MethodKey::Special(SpecialMethod::GetAttr)));

    // Direct field writes bypass every method.
    let obj = class.instantiate(Call::new()).unwrap();
    obj.set("ok", false);

    let late = Function::new(Signature::method("peek"), |a| Ok(a.receiver()?.get("ok")?));
    class
        .define_method(
            MethodKey::Named("peek".into()),
            MethodKind::Instance,
            Arc::new(late),
        )
        .unwrap();
    assert!(!class.is_guarded(&MethodKey::Named("peek".into())));
    assert_eq!(obj.call("peek", Call::new()).unwrap(), Value::Bool(false));

    assert_eq!(
        obj.call_special(SpecialMethod::GetAttr, Call::positional(["ok"]))
            .unwrap(),
        Value::Bool(false)
    );
    let err = obj
        .call_special(SpecialMethod::GetItem, Call::positional(["ok"]))
        .unwrap_err();
    assert_eq!(violation_message(err), "`ok` holds");
}

#[test]
fn the_mutating_method_reports_its_own_violation() {
    checks_on();
    let class = ClassBuilder::new("Flag")
        .invariant("flag stays up", |obj: &ObjectRef| {
            Ok(obj.get("up")?.as_bool() == Some(true))
        })
        .constructor(Function::new(Signature::method("Flag"), |a| {
            a.receiver()?.set("up", true);
            Ok(Value::None)
        }))
        .method(
            "lower",
            Function::new(Signature::method("lower"), |a| {
                a.receiver()?.set("up", false);
                Ok(Value::Int(1))
            }),
        )
        .build()
        .unwrap();
    let obj = class.instantiate(Call::new()).unwrap();
    let err = obj.call("lower", Call::new()).unwrap_err();
    assert_eq!(violation_message(err), "flag stays up");
    // The field write happened even though the call failed.
    assert_eq!(obj.get("up").unwrap(), Value::Bool(false));
}
