//! Builtin function dispatch (spec §4.5). Each function receives the raw,
//! lazily-evaluated argument handles rather than a pre-evaluated `Vec<Value>`
//! so that control-flow functions like `IF` can skip the untaken branch.

mod logical;
mod math;

use lattice_common::{ErrorKind, Value};

use crate::interpreter::ArgumentHandle;

pub fn dispatch(name_upper: &str, args: &[ArgumentHandle]) -> Value {
    match name_upper {
        "SUM" => math::sum(args),
        "AVERAGE" => math::average(args),
        "COUNT" => math::count(args),
        "MAX" => math::max(args),
        "MIN" => math::min(args),
        "IF" => logical::if_fn(args),
        _ => Value::Error(ErrorKind::Name),
    }
}

/// Evaluate every argument, flattening arrays (range reads) into a single
/// row-major value sequence, short-circuiting on the first error found in
/// left-to-right order.
fn collect_values(args: &[ArgumentHandle]) -> Result<Vec<Value>, Value> {
    let mut out = Vec::new();
    for handle in args {
        let v = handle.value();
        match v {
            Value::Error(_) => return Err(v),
            Value::Array(items) => {
                for item in items {
                    if item.is_error() {
                        return Err(item);
                    }
                    out.push(item);
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Numeric operands only — used by `COUNT`, which spec §4.5 states
/// explicitly excludes booleans ("booleans not counted").
fn numerics(values: &[Value]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

/// Numeric operands, with booleans coerced to `1.0`/`0.0` — used by
/// `SUM`/`AVERAGE`/`MAX`/`MIN`, which the original's `isinstance(arg, (int,
/// float))` check folds booleans into (Python `bool` is an `int` subtype).
fn numerics_with_bool(values: &[Value]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        })
        .collect()
}
