//! Declared data types for tabpipe fields.
//!
//! A field's declared type travels as free text so that ingestion can record
//! source-specific names. `DataType` covers the names the engine itself
//! produces and knows how to infer.

use crate::value::Value;

/// Known declared types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point number
    Float,
    /// Boolean type (true/false)
    Bool,
    /// Timestamp stored as Unix milliseconds (UTC)
    Timestamp,
    /// Nested list of values
    List,
}

impl DataType {
    /// Returns the declared-type name written into a schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
            DataType::Timestamp => "timestamp",
            DataType::List => "list",
        }
    }

    /// Parses a declared-type name. Unknown names return `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(DataType::String),
            "int" => Some(DataType::Int),
            "float" => Some(DataType::Float),
            "bool" => Some(DataType::Bool),
            "timestamp" => Some(DataType::Timestamp),
            "list" => Some(DataType::List),
            _ => None,
        }
    }

    /// Returns the type of a single value, or None if it's Null.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Bool),
            Value::Int64(_) => Some(DataType::Int),
            Value::Float64(_) => Some(DataType::Float),
            Value::String(_) => Some(DataType::String),
            Value::DateTime(_) => Some(DataType::Timestamp),
            Value::List(_) => Some(DataType::List),
        }
    }

    /// Infers the declared type of a column from its first non-null cell.
    ///
    /// An empty or all-null column is declared `string`, matching what CSV
    /// ingestion produces.
    pub fn infer(values: &[Value]) -> Self {
        values
            .iter()
            .find_map(DataType::of)
            .unwrap_or(DataType::String)
    }
}
