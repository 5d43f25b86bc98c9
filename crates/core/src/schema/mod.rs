//! Schema module for tabpipe.
//!
//! A schema is the ordered field catalog of a table: names, positions and
//! declared types. It holds no data.

mod catalog;
mod field;

pub use catalog::Schema;
pub use field::Field;
