//! Argument transforms run ahead of preconditions.

mod common;

use clause_check::prelude::*;
use clause_core::RecordError;

use common::{checks_on, iota};

fn sum(values: &[Value]) -> anyhow::Result<i64> {
    let mut total = 0;
    for v in values {
        total += v.expect_int()?;
    }
    Ok(total)
}

fn materialize(a: &Arguments) -> anyhow::Result<Arguments> {
    Ok(rewrite(a, [("l", Value::List(a.get("l")?.elements()?))])?)
}

fn sum_of(contract: Contract) -> clause_check::Contracted {
    contract
        .require("every element must be an integer", |a: &Arguments| {
            Ok(a.get("l")?.elements()?.iter().all(Value::is_int))
        })
        .ensure("the result is the sum of `l`", |a: &Arguments, r: &Value| {
            Ok(r.expect_int()? == sum(&a.get("l")?.elements()?)?)
        })
        .build(|a| Ok(Value::Int(sum(&a.get("l")?.elements()?)?)))
        .unwrap()
}

#[test]
fn streams_are_consumed_by_preconditions_without_a_transform() {
    checks_on();
    let f = sum_of(Contract::new(Signature::new("sum").param("l")));
    assert_eq!(f.call(Call::positional([iota(5)])).unwrap(), Value::Int(0));
}

#[test]
fn transform_materializes_the_stream_first() {
    checks_on();
    let f = sum_of(Contract::new(Signature::new("sum").param("l")).transform(materialize));
    let eager: i64 = (1..5).sum();
    assert_eq!(f.call(Call::positional([iota(5)])).unwrap(), Value::Int(eager));
    assert_eq!(eager, 10);
}

#[test]
fn transform_on_a_method() {
    checks_on();
    let total = Contract::new(Signature::method("total").param("l"))
        .transform(materialize)
        .require("`l` is nonempty", |a: &Arguments| Ok(a.get("l")?.len()? > 0))
        .build(|a| {
            let base = a.receiver()?.get("base")?.expect_int()?;
            Ok(Value::Int(base + sum(&a.get("l")?.elements()?)?))
        })
        .unwrap();
    let class = ClassBuilder::new("Summer")
        .attr("base", 100)
        .invariant("base is an integer", |obj: &ObjectRef| Ok(obj.get("base")?.is_int()))
        .method("total", total)
        .build()
        .unwrap();

    let obj = class.instantiate(Call::new()).unwrap();
    assert_eq!(
        obj.call("total", Call::positional([iota(4)])).unwrap(),
        Value::Int(106)
    );
    // An exhausted stream materializes to an empty list.
    let drained = iota(4);
    drained.elements().unwrap();
    let err = obj.call("total", Call::positional([drained])).unwrap_err();
    assert_eq!(err.violation().unwrap().description, "`l` is nonempty");
}

#[test]
fn transforms_compose_in_declaration_order() {
    checks_on();
    let f = Contract::new(Signature::new("f").param("x"))
        .transform(|a| Ok(rewrite(a, [("x", a.get("x")?.expect_int()? + 1)])?))
        .transform(|a| Ok(rewrite(a, [("x", a.get("x")?.expect_int()? * 10)])?))
        .require("`x` was rewritten", |a: &Arguments| Ok(a.get("x")?.expect_int()? >= 10))
        .build(|a| Ok(a.get("x")?.clone()))
        .unwrap();
    assert_eq!(f.call(Call::positional([1])).unwrap(), Value::Int(20));
}

#[test]
fn rewriting_an_unknown_field_is_a_fault() {
    checks_on();
    let f = Contract::new(Signature::new("f").param("x"))
        .transform(|a| Ok(rewrite(a, [("y", 0)])?))
        .build(|a| Ok(a.get("x")?.clone()))
        .unwrap();
    match f.call(Call::positional([1])).unwrap_err() {
        ContractError::Fault(fault) => {
            assert!(matches!(
                fault.downcast_ref::<RecordError>(),
                Some(RecordError::UnknownField { name, .. }) if name == "y"
            ));
        }
        other => panic!("expected a fault, got {:?}", other),
    }
}
