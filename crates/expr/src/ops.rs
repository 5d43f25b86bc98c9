//! Operator semantics over `Value`s.

use crate::ast::BinaryOp;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use tabpipe_core::{Error, Result, Value};

/// Equality used by `==`, `in` and `contains`: Int64 and Float64 compare by
/// numeric value, lists element-wise, everything else by `Value` equality.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int64(x), Value::Float64(y)) | (Value::Float64(y), Value::Int64(x)) => {
            (*x as f64) == *y
        }
        (Value::Float64(x), Value::Float64(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| loose_eq(a, b))
        }
        _ => a == b,
    }
}

/// Orders two values for `<`, `min` and `max`.
///
/// Returns `Ok(None)` when a NaN is involved, so every comparison with NaN is
/// false.
pub fn compare(a: &Value, b: &Value) -> Result<Option<Ordering>> {
    match (a, b) {
        (Value::Int64(x), Value::Int64(y)) => Ok(Some(x.cmp(y))),
        (Value::String(x), Value::String(y)) => Ok(Some(x.cmp(y))),
        (Value::DateTime(x), Value::DateTime(y)) => Ok(Some(x.cmp(y))),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
            _ => Err(Error::eval(format!(
                "cannot compare {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// Applies an arithmetic, comparison or membership operator. `&&` and `||`
/// short-circuit in the evaluator and never reach here.
pub fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Boolean(loose_eq(&left, &right))),
        BinaryOp::Ne => Ok(Value::Boolean(!loose_eq(&left, &right))),
        BinaryOp::Lt => ordered(&left, &right, |o| o == Ordering::Less),
        BinaryOp::Le => ordered(&left, &right, |o| o != Ordering::Greater),
        BinaryOp::Gt => ordered(&left, &right, |o| o == Ordering::Greater),
        BinaryOp::Ge => ordered(&left, &right, |o| o != Ordering::Less),
        BinaryOp::In => membership(&left, &right).map(Value::Boolean),
        BinaryOp::NotIn => membership(&left, &right).map(|b| Value::Boolean(!b)),
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => sub(left, right),
        BinaryOp::Mul => numeric(op, &left, &right, i64::checked_mul, |x, y| x * y),
        BinaryOp::Div => match (left.as_number(), right.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Float64(x / y)),
            _ => Err(type_error(op, &left, &right)),
        },
        BinaryOp::Mod => match (&left, &right) {
            (Value::Int64(_), Value::Int64(0)) => Err(Error::eval("integer modulo by zero")),
            (Value::Int64(x), Value::Int64(y)) => Ok(Value::Int64(x.wrapping_rem(*y))),
            _ => Err(type_error(op, &left, &right)),
        },
        BinaryOp::And | BinaryOp::Or => {
            match (left.as_bool(), right.as_bool()) {
                (Some(x), Some(y)) => Ok(Value::Boolean(if op == BinaryOp::And {
                    x && y
                } else {
                    x || y
                })),
                _ => Err(type_error(op, &left, &right)),
            }
        }
    }
}

fn ordered(left: &Value, right: &Value, test: impl Fn(Ordering) -> bool) -> Result<Value> {
    Ok(Value::Boolean(compare(left, right)?.map_or(false, test)))
}

fn membership(item: &Value, container: &Value) -> Result<bool> {
    match (item, container) {
        (_, Value::List(items)) => Ok(items.iter().any(|v| loose_eq(item, v))),
        (Value::String(needle), Value::String(hay)) => Ok(hay.contains(needle.as_str())),
        _ => Err(Error::eval(format!(
            "operator in not defined on {} and {}",
            item.type_name(),
            container.type_name()
        ))),
    }
}

fn add(left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            Ok(Value::String(a))
        }
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (Value::DateTime(t), Value::Int64(ms)) | (Value::Int64(ms), Value::DateTime(t)) => t
            .checked_add(ms)
            .map(Value::DateTime)
            .ok_or_else(|| Error::eval("timestamp overflow")),
        (left, right) => numeric(BinaryOp::Add, &left, &right, i64::checked_add, |x, y| x + y),
    }
}

fn sub(left: Value, right: Value) -> Result<Value> {
    match (&left, &right) {
        (Value::DateTime(a), Value::DateTime(b)) => a
            .checked_sub(*b)
            .map(Value::Int64)
            .ok_or_else(|| Error::eval("timestamp overflow")),
        (Value::DateTime(t), Value::Int64(ms)) => t
            .checked_sub(*ms)
            .map(Value::DateTime)
            .ok_or_else(|| Error::eval("timestamp overflow")),
        _ => numeric(BinaryOp::Sub, &left, &right, i64::checked_sub, |x, y| x - y),
    }
}

fn numeric(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (left, right) {
        (Value::Int64(x), Value::Int64(y)) => int_op(*x, *y)
            .map(Value::Int64)
            .ok_or_else(|| Error::eval(format!("integer overflow in {}", op.symbol()))),
        _ => match (left.as_number(), right.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Float64(float_op(x, y))),
            _ => Err(type_error(op, left, right)),
        },
    }
}

fn type_error(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::eval(format!(
        "operator {} not defined on {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

/// Returns the truth value of a predicate result.
pub fn truthy(value: &Value, context: &str) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        Error::eval(format!(
            "{} expects a bool, got {}",
            context,
            value.type_name()
        ))
    })
}

/// Borrows a list argument.
pub fn expect_list<'a>(value: &'a Value, context: &str) -> Result<&'a [Value]> {
    value.as_list().ok_or_else(|| {
        Error::eval(format!(
            "{} expects a list, got {}",
            context,
            value.type_name()
        ))
    })
}

/// Borrows a string argument.
pub fn expect_str<'a>(value: &'a Value, context: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        Error::eval(format!(
            "{} expects a string, got {}",
            context,
            value.type_name()
        ))
    })
}

/// Renders list items with a separator.
pub fn join_rendered(items: &[Value], sep: &str) -> String {
    let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
    parts.join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_division_is_float() {
        assert_eq!(
            binary(BinaryOp::Div, Value::Int64(7), Value::Int64(2)).unwrap(),
            Value::Float64(3.5)
        );
        assert_eq!(
            binary(BinaryOp::Div, Value::Int64(4), Value::Int64(2)).unwrap(),
            Value::Float64(2.0)
        );
    }

    #[test]
    fn test_int_arithmetic_stays_int() {
        assert_eq!(
            binary(BinaryOp::Add, Value::Int64(2), Value::Int64(3)).unwrap(),
            Value::Int64(5)
        );
        assert_eq!(
            binary(BinaryOp::Mul, Value::Int64(2), Value::Float64(1.5)).unwrap(),
            Value::Float64(3.0)
        );
        assert!(binary(BinaryOp::Add, Value::Int64(i64::MAX), Value::Int64(1)).is_err());
        assert_eq!(
            binary(BinaryOp::Mod, Value::Int64(7), Value::Int64(3)).unwrap(),
            Value::Int64(1)
        );
        assert!(binary(BinaryOp::Mod, Value::Int64(7), Value::Int64(0)).is_err());
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(
            binary(BinaryOp::Add, Value::from("ab"), Value::from("cd")).unwrap(),
            Value::from("abcd")
        );
        assert_eq!(
            binary(
                BinaryOp::Add,
                Value::List(vec![Value::Int64(1)]),
                Value::List(vec![Value::Int64(2)])
            )
            .unwrap(),
            Value::List(vec![Value::Int64(1), Value::Int64(2)])
        );
        assert!(binary(BinaryOp::Add, Value::from("a"), Value::Int64(1)).is_err());
    }

    #[test]
    fn test_numeric_equality_crosses_types() {
        assert!(loose_eq(&Value::Int64(1), &Value::Float64(1.0)));
        assert!(!loose_eq(&Value::Int64(1), &Value::from("1")));
        assert!(loose_eq(&Value::Null, &Value::Null));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            binary(BinaryOp::Lt, Value::Int64(1), Value::Float64(1.5)).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            binary(BinaryOp::Ge, Value::from("b"), Value::from("a")).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            binary(BinaryOp::Lt, Value::Float64(f64::NAN), Value::Int64(1)).unwrap(),
            Value::Boolean(false)
        );
        assert!(binary(BinaryOp::Lt, Value::from("a"), Value::Int64(1)).is_err());
    }

    #[test]
    fn test_membership() {
        let list = Value::List(vec![Value::Int64(1), Value::Int64(2)]);
        assert_eq!(
            binary(BinaryOp::In, Value::Float64(2.0), list.clone()).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            binary(BinaryOp::NotIn, Value::Int64(3), list).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            binary(BinaryOp::In, Value::from("ell"), Value::from("hello")).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_datetime_arithmetic() {
        assert_eq!(
            binary(BinaryOp::Add, Value::DateTime(1_000), Value::Int64(500)).unwrap(),
            Value::DateTime(1_500)
        );
        assert_eq!(
            binary(BinaryOp::Sub, Value::DateTime(1_000), Value::DateTime(400)).unwrap(),
            Value::Int64(600)
        );
    }
}
