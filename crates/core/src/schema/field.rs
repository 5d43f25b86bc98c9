//! Field definition for tabpipe schemas.

use crate::types::DataType;
use alloc::string::String;

/// A field definition in a table schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    name: String,
    /// Field position in the schema (0-based).
    position: usize,
    /// Declared type name.
    declared_type: String,
}

impl Field {
    /// Creates a new field. The position is assigned when the field is placed
    /// into a schema.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: 0,
            declared_type: declared_type.into(),
        }
    }

    /// Creates a new field with one of the known declared types.
    pub fn typed(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type.as_str())
    }

    /// Sets the field position.
    pub(crate) fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_declared_type(&mut self, declared_type: String) {
        self.declared_type = declared_type;
    }

    /// Returns the field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the declared type name.
    #[inline]
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    /// Returns the declared type if it is one the engine knows.
    pub fn data_type(&self) -> Option<DataType> {
        DataType::parse(&self.declared_type)
    }

    /// Returns true if both fields agree on name and declared type.
    ///
    /// Position is ignored; union compatibility is decided field by field.
    pub fn same_shape(&self, other: &Field) -> bool {
        self.name == other.name && self.declared_type == other.declared_type
    }
}
