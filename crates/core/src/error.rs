//! Error types for tabpipe.

use alloc::string::String;
use core::fmt;

/// Result type alias for tabpipe operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for table engine operations.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A column or row index outside the current bounds.
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    /// A column whose length disagrees with the table's row count.
    LengthMismatch {
        expected: usize,
        got: usize,
    },
    /// Field name absent from the schema.
    FieldNotFound {
        name: String,
    },
    /// Structural incompatibility between two tables.
    SchemaMismatch {
        message: String,
    },
    /// Join called without key columns.
    NoKeys,
    /// Operation requires rows and columns but the table has none.
    NoData,
    /// A filter predicate evaluated to something other than a boolean.
    ConditionNotBoolean {
        got: &'static str,
    },
    /// Expression failed to parse or bind.
    Compile {
        message: String,
        position: usize,
    },
    /// Expression failed while evaluating.
    Eval {
        message: String,
    },
    /// Wire record could not be decoded.
    Decode {
        message: String,
    },
    /// Table could not be encoded.
    Encode {
        message: String,
    },
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange { what, index, len } => {
                write!(f, "{} index {} out of range (len {})", what, index, len)
            }
            Error::LengthMismatch { expected, got } => {
                write!(f, "Length mismatch: expected {} rows, got {}", expected, got)
            }
            Error::FieldNotFound { name } => write!(f, "Field not found: {}", name),
            Error::SchemaMismatch { message } => write!(f, "Schema mismatch: {}", message),
            Error::NoKeys => f.write_str("No keys provided for join"),
            Error::NoData => f.write_str("No data found"),
            Error::ConditionNotBoolean { got } => {
                write!(f, "Condition must return a boolean value, got {}", got)
            }
            Error::Compile { message, position } => {
                write!(f, "Compile error at {}: {}", position, message)
            }
            Error::Eval { message } => write!(f, "Evaluation error: {}", message),
            Error::Decode { message } => write!(f, "Decode error: {}", message),
            Error::Encode { message } => write!(f, "Encode error: {}", message),
            Error::InvalidOperation { message } => write!(f, "Invalid operation: {}", message),
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Creates an out of range error.
    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Error::OutOfRange { what, index, len }
    }

    /// Creates a length mismatch error.
    pub fn length_mismatch(expected: usize, got: usize) -> Self {
        Error::LengthMismatch { expected, got }
    }

    /// Creates a field not found error.
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Error::FieldNotFound { name: name.into() }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Creates a compile error at a byte offset of the expression source.
    pub fn compile(message: impl Into<String>, position: usize) -> Self {
        Error::Compile {
            message: message.into(),
            position,
        }
    }

    /// Creates an evaluation error.
    pub fn eval(message: impl Into<String>) -> Self {
        Error::Eval {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    /// Creates an encode error.
    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by the expression engine.
    pub fn is_expression_error(&self) -> bool {
        matches!(self, Error::Compile { .. } | Error::Eval { .. })
    }
}
