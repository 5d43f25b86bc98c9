//! Ordered field catalog.

use super::field::Field;
use crate::error::{Error, Result};
use alloc::string::String;
use alloc::vec::Vec;

/// The ordered list of fields of a table.
///
/// Invariant: `fields[i].position() == i` for every field. All mutators
/// renumber positions before returning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema, assigning positions in order.
    pub fn new(fields: Vec<Field>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(i, f)| f.with_position(i))
            .collect();
        Self { fields }
    }

    /// Creates a schema holding `left`'s fields followed by `right`'s, with
    /// positions renumbered sequentially.
    pub fn concat(left: &Schema, right: &Schema) -> Self {
        let fields = left.fields.iter().chain(right.fields.iter()).cloned().collect();
        Self::new(fields)
    }

    /// Returns the fields.
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field at a position.
    pub fn field(&self, position: usize) -> Option<&Field> {
        self.fields.get(position)
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Gets a field position by name. The first match wins.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Gets a field's declared type by name.
    pub fn field_type(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.declared_type())
    }

    /// Returns the field names in order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().into()).collect()
    }

    /// Returns the declared types in order.
    pub fn field_types(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.declared_type().into()).collect()
    }

    /// Appends a field at the next position and returns that position.
    pub fn push(&mut self, field: Field) -> usize {
        let position = self.fields.len();
        self.fields.push(field.with_position(position));
        position
    }

    /// Removes the field at a position, shifting later fields left.
    pub fn remove(&mut self, position: usize) -> Result<Field> {
        if position >= self.fields.len() {
            return Err(Error::out_of_range("field", position, self.fields.len()));
        }
        let removed = self.fields.remove(position);
        for (i, f) in self.fields.iter_mut().enumerate().skip(position) {
            f.set_position(i);
        }
        Ok(removed)
    }

    /// Renames the field at a position. Position and type are unchanged.
    pub fn rename(&mut self, position: usize, name: impl Into<String>) -> Result<()> {
        let len = self.fields.len();
        match self.fields.get_mut(position) {
            Some(f) => {
                f.set_name(name.into());
                Ok(())
            }
            None => Err(Error::out_of_range("field", position, len)),
        }
    }

    /// Changes the declared type of the field at a position.
    pub fn retype(&mut self, position: usize, declared_type: impl Into<String>) -> Result<()> {
        let len = self.fields.len();
        match self.fields.get_mut(position) {
            Some(f) => {
                f.set_declared_type(declared_type.into());
                Ok(())
            }
            None => Err(Error::out_of_range("field", position, len)),
        }
    }

    /// Returns a schema with the fields at `positions`, renumbered in the
    /// given order.
    pub fn select(&self, positions: &[usize]) -> Result<Self> {
        let mut fields = Vec::with_capacity(positions.len());
        for &p in positions {
            let field = self
                .fields
                .get(p)
                .ok_or_else(|| Error::out_of_range("field", p, self.fields.len()))?;
            fields.push(field.clone());
        }
        Ok(Self::new(fields))
    }
}
