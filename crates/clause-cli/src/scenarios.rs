//! Built-in demonstration scenarios.
//!
//! Each scenario defines a few contracted callables or classes under the
//! given [`ContractConfig`], makes a fixed sequence of calls and reports the
//! outcome of every call.

use clause_check::prelude::*;
use clause_check::Contracted;
use serde::Serialize;

/// What one call produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Ok {
        value: serde_json::Value,
    },
    Violation {
        kind: ContractKind,
        callable: String,
        description: String,
    },
    Error {
        message: String,
    },
}

impl From<Result<Value, ContractError>> for Outcome {
    fn from(result: Result<Value, ContractError>) -> Self {
        match result {
            Ok(value) => Outcome::Ok {
                value: value.to_json(),
            },
            Err(ContractError::Violation(v)) => Outcome::Violation {
                kind: v.kind,
                callable: v.callable,
                description: v.description,
            },
            Err(e) => Outcome::Error {
                message: e.to_string(),
            },
        }
    }
}

/// One line of a scenario report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub call: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Default)]
struct Report {
    records: Vec<Record>,
}

impl Report {
    fn record(&mut self, call: &str, result: Result<Value, ContractError>) {
        self.records.push(Record {
            call: call.to_string(),
            outcome: result.into(),
        });
    }

    /// Records an instantiation; the instance is returned for later calls.
    fn instantiate(
        &mut self,
        call_label: &str,
        class: &ClassRef,
        call: Call,
    ) -> Option<ObjectRef> {
        let result = class.instantiate(call);
        let instance = result.as_ref().ok().cloned();
        self.record(call_label, result.map(Value::Object));
        instance
    }
}

type RunFn = fn(ContractConfig) -> anyhow::Result<Vec<Record>>;

/// A named, runnable scenario.
pub struct Scenario {
    pub name: &'static str,
    pub about: &'static str,
    run: RunFn,
}

impl Scenario {
    pub fn run(&self, config: ContractConfig) -> anyhow::Result<Vec<Record>> {
        (self.run)(config)
    }
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "add2",
        about: "integer preconditions on both arguments",
        run: add2,
    },
    Scenario {
        name: "add2-post",
        about: "a postcondition catching a broken body",
        run: add2_post,
    },
    Scenario {
        name: "types",
        about: "the aggregate type check alongside a nonzero precondition",
        run: types_check,
    },
    Scenario {
        name: "nonempty-list",
        about: "class invariants checked around pop and the constructor",
        run: nonempty_list,
    },
    Scenario {
        name: "class-attr",
        about: "a class-level method breaking an invariant for later calls",
        run: class_attr,
    },
    Scenario {
        name: "transform",
        about: "materializing a stream before preconditions consume it",
        run: transform_stream,
    },
];

pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

fn int(args: &Arguments, name: &str) -> anyhow::Result<i64> {
    Ok(args.get(name)?.expect_int()?)
}

fn add2(config: ContractConfig) -> anyhow::Result<Vec<Record>> {
    let add2 = Contract::new(Signature::new("add2").param("i").param("j"))
        .require("`i` must be an integer", |a: &Arguments| Ok(a.get("i")?.is_int()))
        .require("`j` must be an integer", |a: &Arguments| Ok(a.get("j")?.is_int()))
        .with_config(config)
        .build(|a| Ok(Value::Int(int(a, "i")? + int(a, "j")?)))?;

    let mut report = Report::default();
    report.record("add2(1, 2)", add2.call(Call::positional([1, 2])));
    report.record("add2(\"foo\", 2)", add2.call(Call::new().arg("foo").arg(2)));
    report.record("add2(1, \"foo\")", add2.call(Call::new().arg(1).arg("foo")));
    Ok(report.records)
}

fn add2_post(config: ContractConfig) -> anyhow::Result<Vec<Record>> {
    let add2 = Contract::new(Signature::new("add2").param("i").param("j"))
        .require("`i` must be a positive integer", |a: &Arguments| {
            Ok(a.get("i")?.as_int().is_some_and(|i| i > 0))
        })
        .require("`j` must be a positive integer", |a: &Arguments| {
            Ok(a.get("j")?.as_int().is_some_and(|j| j > 0))
        })
        .ensure(
            "the result must be greater than either `i` or `j`",
            |a: &Arguments, result: &Value| {
                let r = result.expect_int()?;
                Ok(r > int(a, "i")? && r > int(a, "j")?)
            },
        )
        .with_config(config)
        .build(|a| {
            let i = int(a, "i")?;
            let j = int(a, "j")?;
            // Broken on purpose for i == 7.
            Ok(Value::Int(if i == 7 { j - i } else { i + j }))
        })?;

    let mut report = Report::default();
    report.record("add2(1, 3)", add2.call(Call::positional([1, 3])));
    report.record("add2(7, 4)", add2.call(Call::positional([7, 4])));
    Ok(report.records)
}

fn types_check(config: ContractConfig) -> anyhow::Result<Vec<Record>> {
    let example = ClassBuilder::new("ExampleClass")
        .with_config(config)
        .build()?;
    let func = Contract::new(
        Signature::new("func")
            .param("a")
            .param("b")
            .param_default("c", 38),
    )
    .types([
        ("a", TypeSpec::of(Kind::Int)),
        ("b", TypeSpec::of(Kind::Str)),
        (
            "c",
            TypeSpec::any_of([Kind::None, Kind::Instance("ExampleClass".into())]),
        ),
    ])
    .require("`a` must be nonzero", |a: &Arguments| Ok(a.get("a")?.is_truthy()))
    .with_config(config)
    .build(|a| {
        Ok(Value::from(format!("{} {}", a.get("a")?, a.get("b")?)))
    })?;

    let mut report = Report::default();
    let instance = example.instantiate(Call::new())?;
    report.record(
        "func(1, \"foo\", ExampleClass())",
        func.call(Call::new().arg(1).arg("foo").arg(instance)),
    );
    report.record(
        "func(1, \"foo\", None)",
        func.call(Call::new().arg(1).arg("foo").arg(Value::None)),
    );
    report.record(
        "func(0, \"foo\", None)",
        func.call(Call::new().arg(0).arg("foo").arg(Value::None)),
    );
    report.record(
        "func(1.0, \"foo\", ExampleClass)",
        func.call(Call::new().arg(1.0).arg("foo").arg(example.clone())),
    );
    report.record("func(1, \"foo\")", func.call(Call::new().arg(1).arg("foo")));
    Ok(report.records)
}

fn inner_list(obj: &ObjectRef) -> anyhow::Result<Vec<Value>> {
    Ok(obj.get("inner")?.expect_list()?.to_vec())
}

fn nonempty_list(config: ContractConfig) -> anyhow::Result<Vec<Record>> {
    let class = ClassBuilder::new("NonemptyList")
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
        .with_config(config)
        .build()?;

    let mut report = Report::default();
    let ints = Value::from(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let list = report.instantiate("NonemptyList([1, 2, 3])", &class, Call::positional([ints]));
    if let Some(list) = list {
        for _ in 0..3 {
            report.record("pop()", list.call("pop", Call::new()));
        }
    }
    let strs = Value::from(vec![Value::from("a"), Value::from("b"), Value::from("c")]);
    report.instantiate(
        "NonemptyList([\"a\", \"b\", \"c\"])",
        &class,
        Call::positional([strs]),
    );
    Ok(report.records)
}

fn class_attr(config: ContractConfig) -> anyhow::Result<Vec<Record>> {
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
        .with_config(config)
        .build()?;

    let mut report = Report::default();
    if let Some(obj) = report.instantiate("Foo()", &foo, Call::new()) {
        report.record("get_always()", obj.call("get_always", Call::new()));
        report.record(
            "Foo.break_everything()",
            foo.call_class("break_everything", Call::new()),
        );
        report.record("get_always()", obj.call("get_always", Call::new()));
    }
    Ok(report.records)
}

fn iota(n: i64) -> Value {
    Value::Stream(Stream::new((1..n).map(Value::Int)))
}

fn sum_of(config: ContractConfig, materialize: bool) -> anyhow::Result<Contracted> {
    let mut contract = Contract::new(Signature::new("sum").param("l"));
    if materialize {
        contract = contract.transform(|a| {
            Ok(rewrite(a, [("l", Value::List(a.get("l")?.elements()?))])?)
        });
    }
    let contracted = contract
        .require("every element must be an integer", |a: &Arguments| {
            Ok(a.get("l")?.elements()?.iter().all(Value::is_int))
        })
        .with_config(config)
        .build(|a| {
            let mut total = 0;
            for v in a.get("l")?.elements()? {
                total += v.expect_int()?;
            }
            Ok(Value::Int(total))
        })?;
    Ok(contracted)
}

fn transform_stream(config: ContractConfig) -> anyhow::Result<Vec<Record>> {
    let lazy = sum_of(config, false)?;
    let eager = sum_of(config, true)?;

    let mut report = Report::default();
    report.record("sum(iota(5))", lazy.call(Call::positional([iota(5)])));
    report.record(
        "sum(iota(5)) with transform",
        eager.call(Call::positional([iota(5)])),
    );
    Ok(report.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(name: &str, config: ContractConfig) -> Vec<Record> {
        find(name).unwrap().run(config).unwrap()
    }

    fn outcomes(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .map(|r| match &r.outcome {
                Outcome::Ok { .. } => "ok",
                Outcome::Violation { .. } => "violation",
                Outcome::Error { .. } => "error",
            })
            .collect()
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = SCENARIOS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SCENARIOS.len());
        assert!(find("nope").is_none());
    }

    #[test]
    fn add2_report() {
        let records = run("add2", ContractConfig::enabled());
        assert_eq!(outcomes(&records), ["ok", "violation", "violation"]);
        assert_eq!(
            serde_json::to_value(&records[1]).unwrap(),
            json!({
                "call": "add2(\"foo\", 2)",
                "outcome": "violation",
                "kind": "precondition",
                "callable": "add2",
                "description": "`i` must be an integer",
            })
        );
    }

    #[test]
    fn unchecked_add2_reports_the_body_error() {
        let records = run("add2", ContractConfig::disabled());
        assert_eq!(outcomes(&records), ["ok", "error", "error"]);
        assert_eq!(
            serde_json::to_value(&records[1]).unwrap(),
            json!({
                "call": "add2(\"foo\", 2)",
                "outcome": "error",
                "message": "expected int, got str",
            })
        );
    }

    #[test]
    fn add2_post_report() {
        let records = run("add2-post", ContractConfig::enabled());
        assert_eq!(outcomes(&records), ["ok", "violation"]);
        assert_eq!(records[0].outcome, Outcome::Ok { value: json!(4) });
        let records = run("add2-post", ContractConfig::disabled());
        assert_eq!(records[1].outcome, Outcome::Ok { value: json!(-3) });
    }

    #[test]
    fn types_report() {
        let records = run("types", ContractConfig::enabled());
        assert_eq!(
            outcomes(&records),
            ["ok", "ok", "violation", "violation", "violation"]
        );
        assert_eq!(records[0].outcome, Outcome::Ok { value: json!("1 foo") });
        assert_eq!(records[1].outcome, Outcome::Ok { value: json!("1 foo") });
        assert!(matches!(
            &records[2].outcome,
            Outcome::Violation { description, .. } if description == "`a` must be nonzero"
        ));
    }

    #[test]
    fn nonempty_list_report() {
        let records = run("nonempty-list", ContractConfig::enabled());
        assert_eq!(
            outcomes(&records),
            ["ok", "ok", "ok", "violation", "violation"]
        );
        let unchecked = run("nonempty-list", ContractConfig::disabled());
        assert_eq!(outcomes(&unchecked), ["ok", "ok", "ok", "ok", "ok"]);
    }

    #[test]
    fn class_attr_report() {
        let records = run("class-attr", ContractConfig::enabled());
        assert_eq!(outcomes(&records), ["ok", "ok", "ok", "violation"]);
        assert_eq!(records[1].outcome, Outcome::Ok { value: json!(true) });
    }

    #[test]
    fn transform_report() {
        let records = run("transform", ContractConfig::enabled());
        assert_eq!(records[0].outcome, Outcome::Ok { value: json!(0) });
        assert_eq!(records[1].outcome, Outcome::Ok { value: json!(10) });
    }
}
