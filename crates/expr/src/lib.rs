//! Tabpipe Expr - the embedded expression language used by filters and
//! transforms.
//!
//! This crate provides:
//!
//! - `Program`: parse, name-check and evaluate an expression
//! - `Environment`: the name resolution seam between programs and tables
//! - `FunctionRegistry`: host functions callable from expressions
//! - `ast`: the syntax tree and its identifier walk
//!
//! # Example
//!
//! ```rust
//! use tabpipe_core::Value;
//! use tabpipe_expr::{Bindings, Program};
//!
//! let mut env = Bindings::new();
//! env.set("price", 12i64).set("qty", 3i64);
//!
//! let program = Program::compile("price * qty > 30 ? 'bulk' : 'single'", &env).unwrap();
//! assert_eq!(program.run(&env).unwrap(), Value::from("bulk"));
//! assert_eq!(program.identifiers(), vec!["price", "qty"]);
//! ```

#![no_std]

extern crate alloc;

pub mod ast;
mod builtins;
mod env;
mod eval;
mod functions;
mod lexer;
mod ops;
mod parser;
mod program;

pub use builtins::Builtin;
pub use env::{Bindings, Environment};
pub use functions::{Callable, FunctionRegistry};
pub use parser::MAX_DEPTH;
pub use program::Program;

/// Binding name under which registry functions are reachable:
/// `functions.name(args)`.
pub const REGISTRY_NAME: &str = "functions";
