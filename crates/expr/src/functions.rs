//! Named host functions exposed to expressions.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use tabpipe_core::{Result, Value};

/// A host function callable from expressions.
pub type Callable = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// Registry of named callables.
///
/// Cloning is cheap: callables are reference counted, so derived tables can
/// carry their own copy of the registry.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Callable>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure under a name, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> Option<Callable>
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.insert(name, Rc::new(f))
    }

    /// Inserts a callable under a name, returning the previous entry.
    pub fn insert(&mut self, name: impl Into<String>, f: Callable) -> Option<Callable> {
        self.functions.insert(name.into(), f)
    }

    /// Removes a callable.
    pub fn remove(&mut self, name: &str) -> Option<Callable> {
        self.functions.remove(name)
    }

    /// Looks up a callable.
    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
