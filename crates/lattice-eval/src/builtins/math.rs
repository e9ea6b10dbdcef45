use lattice_common::{ErrorKind, Value};

use super::{collect_values, numerics, numerics_with_bool};
use crate::interpreter::ArgumentHandle;

pub fn sum(args: &[ArgumentHandle]) -> Value {
    let values = match collect_values(args) {
        Ok(v) => v,
        Err(e) => return e,
    };
    Value::Number(numerics_with_bool(&values).into_iter().sum())
}

pub fn average(args: &[ArgumentHandle]) -> Value {
    let values = match collect_values(args) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let nums = numerics_with_bool(&values);
    if nums.is_empty() {
        return Value::Error(ErrorKind::Div0);
    }
    Value::Number(nums.iter().sum::<f64>() / nums.len() as f64)
}

pub fn count(args: &[ArgumentHandle]) -> Value {
    let values = match collect_values(args) {
        Ok(v) => v,
        Err(e) => return e,
    };
    Value::Number(numerics(&values).len() as f64)
}

/// MAX/MIN with no numeric arguments fall back to `0` (legacy spreadsheet
/// compatibility rule, spec §4.5), rather than erroring.
pub fn max(args: &[ArgumentHandle]) -> Value {
    let values = match collect_values(args) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let nums = numerics_with_bool(&values);
    if nums.is_empty() {
        return Value::Number(0.0);
    }
    Value::Number(nums.into_iter().fold(f64::NEG_INFINITY, f64::max))
}

pub fn min(args: &[ArgumentHandle]) -> Value {
    let values = match collect_values(args) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let nums = numerics_with_bool(&values);
    if nums.is_empty() {
        return Value::Number(0.0);
    }
    Value::Number(nums.into_iter().fold(f64::INFINITY, f64::min))
}
