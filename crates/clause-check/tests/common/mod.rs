//! Shared helpers for clause-check integration tests.

#![allow(dead_code)]

use clause_check::prelude::*;
use clause_check::toggle;

/// Every test in a binary that calls this sees checks on.
pub fn checks_on() {
    toggle::set_contracts_enabled(true);
}

pub fn int(args: &Arguments, name: &str) -> anyhow::Result<i64> {
    Ok(args.get(name)?.expect_int()?)
}

/// A one-shot stream yielding `1..n`.
pub fn iota(n: i64) -> Value {
    Value::Stream(Stream::new((1..n).map(Value::Int)))
}

pub fn violation_message(err: ContractError) -> String {
    match err {
        ContractError::Violation(v) => v.description,
        other => panic!("expected a contract violation, got {:?}", other),
    }
}
