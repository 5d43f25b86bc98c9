//! Builtin functions.
//!
//! Scalar builtins receive evaluated arguments. Predicate builtins (`map`,
//! `filter`, `all`, `any`, `none`, `count`, `reduce`) take an unevaluated
//! second argument, which the evaluator runs once per list element with the
//! `#` pointers bound.

use crate::ops::{compare, expect_list, expect_str, join_rendered, loose_eq};
use alloc::format;
use alloc::string::{String, ToString};
use core::cmp::Ordering;
use tabpipe_core::{Error, Result, Value};

/// Builtin functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Len,
    Abs,
    Int,
    Float,
    String,
    Upper,
    Lower,
    Trim,
    Replace,
    Split,
    Join,
    HasPrefix,
    HasSuffix,
    Contains,
    Max,
    Min,
    Sum,
    Mean,
    First,
    Last,
    Floor,
    Ceil,
    Round,
    Date,
    Map,
    Filter,
    All,
    Any,
    None,
    Count,
    Reduce,
}

impl Builtin {
    /// Resolves a builtin by name.
    pub fn lookup(name: &str) -> Option<Self> {
        let builtin = match name {
            "len" => Builtin::Len,
            "abs" => Builtin::Abs,
            "int" => Builtin::Int,
            "float" => Builtin::Float,
            "string" => Builtin::String,
            "upper" => Builtin::Upper,
            "lower" => Builtin::Lower,
            "trim" => Builtin::Trim,
            "replace" => Builtin::Replace,
            "split" => Builtin::Split,
            "join" => Builtin::Join,
            "hasPrefix" => Builtin::HasPrefix,
            "hasSuffix" => Builtin::HasSuffix,
            "contains" => Builtin::Contains,
            "max" => Builtin::Max,
            "min" => Builtin::Min,
            "sum" => Builtin::Sum,
            "mean" => Builtin::Mean,
            "first" => Builtin::First,
            "last" => Builtin::Last,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            "round" => Builtin::Round,
            "date" => Builtin::Date,
            "map" => Builtin::Map,
            "filter" => Builtin::Filter,
            "all" => Builtin::All,
            "any" => Builtin::Any,
            "none" => Builtin::None,
            "count" => Builtin::Count,
            "reduce" => Builtin::Reduce,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Abs => "abs",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::String => "string",
            Builtin::Upper => "upper",
            Builtin::Lower => "lower",
            Builtin::Trim => "trim",
            Builtin::Replace => "replace",
            Builtin::Split => "split",
            Builtin::Join => "join",
            Builtin::HasPrefix => "hasPrefix",
            Builtin::HasSuffix => "hasSuffix",
            Builtin::Contains => "contains",
            Builtin::Max => "max",
            Builtin::Min => "min",
            Builtin::Sum => "sum",
            Builtin::Mean => "mean",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::Round => "round",
            Builtin::Date => "date",
            Builtin::Map => "map",
            Builtin::Filter => "filter",
            Builtin::All => "all",
            Builtin::Any => "any",
            Builtin::None => "none",
            Builtin::Count => "count",
            Builtin::Reduce => "reduce",
        }
    }

    /// Minimum and maximum argument counts; `None` means unbounded.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Builtin::Replace => (3, Some(3)),
            Builtin::Split
            | Builtin::HasPrefix
            | Builtin::HasSuffix
            | Builtin::Contains
            | Builtin::Map
            | Builtin::Filter
            | Builtin::All
            | Builtin::Any
            | Builtin::None
            | Builtin::Count => (2, Some(2)),
            Builtin::Join => (1, Some(2)),
            Builtin::Reduce => (2, Some(3)),
            Builtin::Max | Builtin::Min => (1, None),
            _ => (1, Some(1)),
        }
    }

    /// Returns true if the second argument is evaluated per element.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            Builtin::Map
                | Builtin::Filter
                | Builtin::All
                | Builtin::Any
                | Builtin::None
                | Builtin::Count
                | Builtin::Reduce
        )
    }

    /// Checks an argument count.
    pub fn check_arity(&self, got: usize) -> core::result::Result<(), String> {
        let (min, max) = self.arity();
        let ok = got >= min && max.map_or(true, |m| got <= m);
        if ok {
            return Ok(());
        }
        let expected = match max {
            Some(m) if m == min => format!("{}", min),
            Some(m) => format!("{} to {}", min, m),
            None => format!("at least {}", min),
        };
        Err(format!(
            "{} expects {} argument(s), got {}",
            self.name(),
            expected,
            got
        ))
    }
}

/// Applies a scalar builtin to evaluated arguments.
pub fn apply(builtin: Builtin, args: &[Value]) -> Result<Value> {
    builtin.check_arity(args.len()).map_err(Error::eval)?;
    let name = builtin.name();
    let arg = &args[0];
    match builtin {
        Builtin::Len => match arg {
            Value::String(s) => Ok(Value::Int64(s.chars().count() as i64)),
            Value::List(items) => Ok(Value::Int64(items.len() as i64)),
            _ => Err(unsupported(name, arg)),
        },
        Builtin::Abs => match arg {
            Value::Int64(v) => v
                .checked_abs()
                .map(Value::Int64)
                .ok_or_else(|| Error::eval("integer overflow in abs")),
            Value::Float64(v) => Ok(Value::Float64(libm::fabs(*v))),
            _ => Err(unsupported(name, arg)),
        },
        Builtin::Int => to_int(arg),
        Builtin::Float => to_float(arg),
        Builtin::String => Ok(Value::String(arg.to_string())),
        Builtin::Upper => Ok(Value::String(expect_str(arg, name)?.to_uppercase())),
        Builtin::Lower => Ok(Value::String(expect_str(arg, name)?.to_lowercase())),
        Builtin::Trim => Ok(Value::from(expect_str(arg, name)?.trim())),
        Builtin::Replace => {
            let s = expect_str(arg, name)?;
            let from = expect_str(&args[1], name)?;
            let to = expect_str(&args[2], name)?;
            Ok(Value::String(s.replace(from, to)))
        }
        Builtin::Split => {
            let s = expect_str(arg, name)?;
            let sep = expect_str(&args[1], name)?;
            let parts = if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(sep).map(Value::from).collect()
            };
            Ok(Value::List(parts))
        }
        Builtin::Join => {
            let items = expect_list(arg, name)?;
            let sep = match args.get(1) {
                Some(v) => expect_str(v, name)?,
                None => "",
            };
            Ok(Value::String(join_rendered(items, sep)))
        }
        Builtin::HasPrefix => Ok(Value::Boolean(
            expect_str(arg, name)?.starts_with(expect_str(&args[1], name)?),
        )),
        Builtin::HasSuffix => Ok(Value::Boolean(
            expect_str(arg, name)?.ends_with(expect_str(&args[1], name)?),
        )),
        Builtin::Contains => match arg {
            Value::String(s) => Ok(Value::Boolean(s.contains(expect_str(&args[1], name)?))),
            Value::List(items) => Ok(Value::Boolean(
                items.iter().any(|v| loose_eq(v, &args[1])),
            )),
            _ => Err(unsupported(name, arg)),
        },
        Builtin::Max => extreme(name, args, Ordering::Greater),
        Builtin::Min => extreme(name, args, Ordering::Less),
        Builtin::Sum => sum(expect_list(arg, name)?),
        Builtin::Mean => {
            let items = expect_list(arg, name)?;
            if items.is_empty() {
                return Ok(Value::Float64(0.0));
            }
            let mut total = 0.0;
            for item in items {
                total += item.as_number().ok_or_else(|| unsupported(name, item))?;
            }
            Ok(Value::Float64(total / items.len() as f64))
        }
        Builtin::First => Ok(expect_list(arg, name)?.first().cloned().unwrap_or(Value::Null)),
        Builtin::Last => Ok(expect_list(arg, name)?.last().cloned().unwrap_or(Value::Null)),
        Builtin::Floor => float_fn(name, arg, libm::floor),
        Builtin::Ceil => float_fn(name, arg, libm::ceil),
        Builtin::Round => float_fn(name, arg, libm::round),
        Builtin::Date => to_date(arg),
        Builtin::Map
        | Builtin::Filter
        | Builtin::All
        | Builtin::Any
        | Builtin::None
        | Builtin::Count
        | Builtin::Reduce => Err(Error::eval(format!(
            "{} requires a predicate argument",
            name
        ))),
    }
}

fn unsupported(name: &str, arg: &Value) -> Error {
    Error::eval(format!("{} not defined on {}", name, arg.type_name()))
}

fn to_int(arg: &Value) -> Result<Value> {
    match arg {
        Value::Int64(v) => Ok(Value::Int64(*v)),
        Value::Float64(v) => float_to_int(*v),
        Value::Boolean(b) => Ok(Value::Int64(*b as i64)),
        Value::DateTime(ms) => Ok(Value::Int64(*ms)),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(v) => Ok(Value::Int64(v)),
                Err(_) => match s.parse::<f64>() {
                    Ok(v) => float_to_int(v),
                    Err(_) => Err(Error::eval(format!("cannot convert {:?} to int", s))),
                },
            }
        }
        _ => Err(unsupported("int", arg)),
    }
}

fn float_to_int(v: f64) -> Result<Value> {
    let t = libm::trunc(v);
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Ok(Value::Int64(t as i64))
    } else {
        Err(Error::eval(format!("cannot convert {} to int", v)))
    }
}

fn to_float(arg: &Value) -> Result<Value> {
    match arg {
        Value::Int64(v) => Ok(Value::Float64(*v as f64)),
        Value::Float64(v) => Ok(Value::Float64(*v)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|_| Error::eval(format!("cannot convert {:?} to float", s))),
        _ => Err(unsupported("float", arg)),
    }
}

fn float_fn(name: &str, arg: &Value, f: fn(f64) -> f64) -> Result<Value> {
    arg.as_number()
        .map(|v| Value::Float64(f(v)))
        .ok_or_else(|| unsupported(name, arg))
}

fn extreme(name: &str, args: &[Value], want: Ordering) -> Result<Value> {
    let items = match args {
        [Value::List(items)] => items.as_slice(),
        _ => args,
    };
    let mut best: Option<&Value> = None;
    for item in items {
        let comparable = matches!(
            item,
            Value::Int64(_) | Value::Float64(_) | Value::String(_) | Value::DateTime(_)
        );
        if !comparable {
            return Err(unsupported(name, item));
        }
        best = match best {
            Some(current) if compare(item, current)? != Some(want) => Some(current),
            _ => Some(item),
        };
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn sum(items: &[Value]) -> Result<Value> {
    let mut int_total: i64 = 0;
    let mut float_total = 0.0;
    let mut is_float = false;
    for item in items {
        match item {
            Value::Int64(v) if !is_float => match int_total.checked_add(*v) {
                Some(t) => int_total = t,
                None => return Err(Error::eval("integer overflow in sum")),
            },
            Value::Int64(v) => float_total += *v as f64,
            Value::Float64(v) => {
                if !is_float {
                    is_float = true;
                    float_total = int_total as f64;
                }
                float_total += v;
            }
            _ => return Err(unsupported("sum", item)),
        }
    }
    if is_float {
        Ok(Value::Float64(float_total))
    } else {
        Ok(Value::Int64(int_total))
    }
}

fn to_date(arg: &Value) -> Result<Value> {
    match arg {
        Value::DateTime(ms) => Ok(Value::DateTime(*ms)),
        Value::Int64(ms) => Ok(Value::DateTime(*ms)),
        Value::String(s) => parse_date(s.trim())
            .map(Value::DateTime)
            .ok_or_else(|| Error::eval(format!("cannot parse {:?} as a date", s))),
        _ => Err(unsupported("date", arg)),
    }
}

/// Parses RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD` into Unix
/// milliseconds.
fn parse_date(s: &str) -> Option<i64> {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}
