use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// Shared handle to an environment. Closures keep their defining
/// environment alive through this handle after the defining call returns.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    /// A fresh top-level scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// A child scope whose lookups fall back to `outer`.
    pub fn new_enclosed(outer: Env) -> Self {
        Self {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    pub fn into_shared(self) -> Env {
        Rc::new(RefCell::new(self))
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(object) = self.store.get(name) {
            return Some(object.clone());
        }

        match self.outer {
            Some(ref outer) => outer.borrow().get(name),
            None => None,
        }
    }

    /// Binds `name` in this scope only, overwriting a previous binding here
    /// and never touching the outer chain.
    pub fn set(&mut self, name: impl Into<String>, value: Object) {
        self.store.insert(name.into(), value);
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }
}
