use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

/// A scope of bindings. Cloning shares the same scope; closures and child
/// scopes keep their enclosing scope alive.
#[derive(Clone, Default)]
pub struct Environment {
    env_ptr: Rc<RefCell<EnvironmentData>>,
}

#[derive(Default)]
struct EnvironmentData {
    values: HashMap<String, Value>,
    enclosing: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(env: &Environment) -> Self {
        let env_data = EnvironmentData {
            values: HashMap::new(),
            enclosing: Some(env.clone()),
        };
        Environment {
            env_ptr: Rc::new(RefCell::new(env_data)),
        }
    }

    /// Binds `name` in this scope, replacing any binding of the same name
    /// here and shadowing any in enclosing scopes.
    pub fn define(&self, name: String, value: Value) {
        self.env_ptr.borrow_mut().values.insert(name, value);
    }

    /// Looks `name` up, innermost scope first.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut env = self.clone();
        loop {
            let enclosing = {
                let data = env.env_ptr.borrow();
                if let Some(value) = data.values.get(name) {
                    return Some(value.clone());
                }
                data.enclosing.clone()
            };

            env = enclosing?;
        }
    }

    /// Names bound directly in this scope, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.env_ptr.borrow().values.keys().cloned().collect();
        names.sort();
        names
    }
}
