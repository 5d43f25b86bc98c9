//! Relational and expression operations on `Table`.
//!
//! Each submodule adds one group of methods to `Table`.

mod distinct;
mod filter;
mod join;
mod project;
mod stats;
mod transform;
mod union;

pub use transform::transform_target;
