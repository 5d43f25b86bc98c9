//! Name resolution for expressions.

use crate::functions::FunctionRegistry;
use alloc::string::String;
use hashbrown::HashMap;
use tabpipe_core::Value;

/// Supplies variable bindings and host functions to a program.
pub trait Environment {
    /// Resolves a variable name.
    fn resolve(&self, name: &str) -> Option<Value>;

    /// Returns true if `name` is bound. Used by compile-time checks, so
    /// implementations should avoid materializing the value.
    fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Returns the host function registry.
    fn functions(&self) -> &FunctionRegistry;
}

/// A map-backed environment.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
    functions: FunctionRegistry,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates bindings that share a function registry.
    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Self {
            values: HashMap::new(),
            functions,
        }
    }

    /// Binds a name, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }
}

impl Environment for Bindings {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
