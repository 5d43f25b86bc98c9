//! Value type definitions for tabpipe.
//!
//! This module defines the `Value` enum which represents any value that can be
//! stored in a table cell. Columns are sequences of `Value`s and a single
//! column may hold cells of different variants.

use crate::types::DataType;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A value that can be stored in a table cell.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// UTF-8 string
    String(String),
    /// DateTime stored as Unix timestamp in milliseconds (UTC)
    DateTime(i64),
    /// Ordered list of values. Whole-column expression bindings use this variant.
    List(Vec<Value>),
}

impl Value {
    /// Known type of the cell; `None` for nulls.
    pub fn data_type(&self) -> Option<DataType> {
        DataType::of(self)
    }

    /// Short variant name for error messages.
    pub fn type_name(&self) -> &'static str {
        self.data_type().map_or("null", |dt| dt.as_str())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Value::Int64(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        if let Value::Float64(x) = self {
            Some(*x)
        } else {
            None
        }
    }

    /// Int64 or Float64 cell as f64.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Value::Int64(i) => Some(i as f64),
            Value::Float64(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Milliseconds since the Unix epoch for DateTime cells.
    pub fn as_datetime(&self) -> Option<i64> {
        if let Value::DateTime(ms) = self {
            Some(*ms)
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        if let Value::List(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Rank used when two cells of unrelated variants are ordered. Numbers
    /// share a rank so that Int64 and Float64 interleave.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int64(_) | Value::Float64(_) => 2,
            Value::String(_) => 3,
            Value::DateTime(_) => 4,
            Value::List(_) => 5,
        }
    }
}

/// Total order over f64 with every NaN equal and above all numbers.
fn total_cmp_f64(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => a.is_nan().cmp(&b.is_nan()),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(x), Boolean(y)) => x == y,
            (Int64(x), Int64(y)) | (DateTime(x), DateTime(y)) => x == y,
            (Float64(x), Float64(y)) => x == y || (x.is_nan() && y.is_nan()),
            (String(x), String(y)) => x == y,
            (List(x), List(y)) => x == y,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Int64(n) | Value::DateTime(n) => n.hash(state),
            // NaNs are equal to each other, so they share one bit pattern.
            Value::Float64(x) if x.is_nan() => f64::NAN.to_bits().hash(state),
            // -0.0 == 0.0, so both hash as 0.0.
            Value::Float64(x) if *x == 0.0 => 0.0f64.to_bits().hash(state),
            Value::Float64(x) => x.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::List(items) => items.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Null sorts first. Int64 and Float64 compare numerically; otherwise cells
/// of different variants order by rank.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        match (self, other) {
            (Boolean(x), Boolean(y)) => x.cmp(y),
            (Int64(x), Int64(y)) | (DateTime(x), DateTime(y)) => x.cmp(y),
            (Int64(x), Float64(y)) => total_cmp_f64(*x as f64, *y),
            (Float64(x), Int64(y)) => total_cmp_f64(*x, *y as f64),
            (Float64(x), Float64(y)) => total_cmp_f64(*x, *y),
            (String(x), String(y)) => x.cmp(y),
            (List(x), List(y)) => x.cmp(y),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Canonical text rendering of a value.
///
/// Join keys are built from this rendering, so every variant has exactly one
/// textual form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
            Value::DateTime(ms) => match chrono::DateTime::from_timestamp_millis(*ms) {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
                None => write!(f, "{}ms", ms),
            },
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v.into())
            }
        })*
    };
}

value_from! {
    bool => Boolean,
    i32 => Int64,
    i64 => Int64,
    f32 => Float64,
    f64 => Float64,
    String => String,
    &str => String,
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int64(42).data_type(), Some(DataType::Int));
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_accessors_match_variant_only() {
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Int64(100).as_i64(), Some(100));
        assert_eq!(Value::Int64(100).as_f64(), None);
        assert_eq!(Value::Float64(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Int64(3).as_number(), Some(3.0));
        assert_eq!(Value::from("ocean").as_str(), Some("ocean"));
        assert_eq!(Value::DateTime(86_400_000).as_datetime(), Some(86_400_000));
        assert_eq!(Value::DateTime(5).as_i64(), None);
        assert_eq!(
            Value::List(vec![Value::Int64(1)]).as_list(),
            Some(&[Value::Int64(1)][..])
        );
    }

    #[test]
    fn test_value_equality_is_strict() {
        assert_eq!(Value::Int64(42), Value::Int64(42));
        assert_ne!(Value::Int64(1), Value::Float64(1.0));
        assert_ne!(Value::Int64(1), Value::DateTime(1));
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
        assert_ne!(Value::from("1"), Value::Int64(1));
    }

    fn hash_of(value: &Value) -> u64 {
        use core::hash::BuildHasher;
        hashbrown::hash_map::DefaultHashBuilder::default().hash_one(value)
    }

    #[test]
    fn test_signed_zero_hashes_like_zero() {
        let pos = Value::Float64(0.0);
        let neg = Value::Float64(-0.0);
        assert_eq!(pos, neg);
        assert_eq!(hash_of(&pos), hash_of(&neg));
        assert_eq!(
            hash_of(&Value::Float64(f64::NAN)),
            hash_of(&Value::Float64(-f64::NAN))
        );
    }

    #[test]
    fn test_order_across_variants() {
        let mut cells = vec![
            Value::from("b"),
            Value::Float64(1.5),
            Value::Null,
            Value::Int64(2),
            Value::Boolean(false),
            Value::Int64(1),
            Value::Float64(f64::NAN),
        ];
        cells.sort();
        assert_eq!(cells[0], Value::Null);
        assert_eq!(cells[1], Value::Boolean(false));
        assert_eq!(&cells[2..5], &[Value::Int64(1), Value::Float64(1.5), Value::Int64(2)]);
        assert_eq!(cells[5], Value::Float64(f64::NAN));
        assert_eq!(cells[6], Value::from("b"));
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(format!("{}", Value::Int64(-7)), "-7");
        assert_eq!(format!("{}", Value::Float64(1.0)), "1");
        assert_eq!(format!("{}", Value::Float64(2.25)), "2.25");
        assert_eq!(format!("{}", Value::from("NEAR BAY")), "NEAR BAY");
        assert_eq!(format!("{}", Value::Null), "null");
        assert_eq!(
            format!("{}", Value::List(vec![Value::Int64(1), Value::Boolean(true)])),
            "[1, true]"
        );
        assert_eq!(
            format!("{}", Value::DateTime(86_400_000 + 1)),
            "1970-01-02T00:00:00.001Z"
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(42i32), Value::Int64(42));
        assert_eq!(Value::from(0.5f32), Value::Float64(0.5));
        assert_eq!(Value::from(Some(100i64)), Value::Int64(100));
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(vec![Value::Null]), Value::List(vec![Value::Null]));
    }
}
