use crate::error::{LoxError, Result};
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One scope frame.  Lookups and assignments that miss locally walk the
/// `enclosing` chain outward to the global frame.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn enclosing(&self) -> Option<&Rc<RefCell<Environment>>> {
        self.enclosing.as_ref()
    }

    /// Create or overwrite `name` in this frame only; an outer binding of
    /// the same name is shadowed, not touched.
    pub fn define(&mut self, name: &str, value: Value) {
        debug!("define '{}' = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(LoxError::undefined_variable(name, line))
        }
    }

    /// Overwrite the nearest existing binding of `name`.  Never creates one.
    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name) {
            debug!("assign '{}' = {}", name, value);
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(LoxError::undefined_variable(name, line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_with(name: &str, value: f64) -> Rc<RefCell<Environment>> {
        let env = Rc::new(RefCell::new(Environment::new()));
        env.borrow_mut().define(name, Value::Number(value));
        env
    }

    #[test]
    fn get_delegates_to_parent() {
        let global = global_with("a", 1.0);
        let child = Environment::with_enclosing(global);

        assert_eq!(child.get("a", 1).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn define_shadows_without_touching_parent() {
        let global = global_with("a", 1.0);
        let mut child = Environment::with_enclosing(Rc::clone(&global));

        child.define("a", Value::Number(2.0));

        assert_eq!(child.get("a", 1).unwrap(), Value::Number(2.0));
        assert_eq!(global.borrow().get("a", 1).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_mutates_nearest_binding() {
        let global = global_with("a", 1.0);
        let mut child = Environment::with_enclosing(Rc::clone(&global));

        child.assign("a", Value::Number(5.0), 1).unwrap();

        assert_eq!(global.borrow().get("a", 1).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn undeclared_names_fail() {
        let mut env = Environment::new();

        let read = env.get("ghost", 3).unwrap_err();
        let write = env.assign("ghost", Value::Nil, 4).unwrap_err();

        assert!(matches!(read, LoxError::Runtime { line: 3, .. }));
        assert!(matches!(write, LoxError::Runtime { line: 4, .. }));
        assert!(write.to_string().contains("ghost"));
    }
}
