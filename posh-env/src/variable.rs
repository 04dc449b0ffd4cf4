//! `VariableStore`: "A mapping from name (identifier) to (value,
    //! exported, read-only). A cached process-environment array is rebuilt lazily
//! for process launch."
//!
//! Grounded on `yash-env/src/variable.rs`'s `Variable`/`VariableSet`, but
//! flattened: the teacher keeps an internal stack of `Context`s (regular vs.
    //! volatile) inside `VariableSet` itself so that function calls can push a
//! temporary scope directly. Here, scoping is entirely the job of the
//! `ExecutionFrame`/policy system (spec §4.4: a `Function` frame gets
    //! `variables: SHARE (+locals overlay)`, a `Subshell` frame gets `COPY`), so
//! `VariableStore` stays a flat map with no internal context stack — a
//! deliberate simplification, not an oversight.

use std::collections::HashMap;
use std::rc::Rc;

/// A single shell variable's value and attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Variable {
    pub value: Rc<str>,
    pub exported: bool,
    pub read_only: bool,
}

impl Variable {
    pub fn new(value: impl Into<Rc<str>>) -> Self {
        Variable {
            value: value.into(),
            exported: false,
            read_only: false,
        }
    }

    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Attempt to modify a variable marked read-only.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{name}: is read-only")]
pub struct ReadOnlyError {
    pub name: String,
}

/// Flat `name -> Variable` map plus a lazily rebuilt environment-array cache.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    vars: HashMap<String, Variable>,
    envp_cache: std::cell::RefCell<Option<Rc<[(Rc<str>, Rc<str>)]>>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|v| &*v.value)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Assigns `value` to `name`, preserving any existing `exported` flag.
    /// Fails if the variable is read-only.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<Rc<str>>) -> Result<(), ReadOnlyError> {
        let name = name.into();
        if let Some(existing) = self.vars.get(&name) {
            if existing.read_only {
                return Err(ReadOnlyError { name });
            }
        }
        let exported = self.vars.get(&name).map(|v| v.exported).unwrap_or(false);
        self.vars.insert(
            name,
            Variable {
                value: value.into(),
                exported,
                read_only: false,
            },
        );
        self.envp_cache.borrow_mut().take();
        Ok(())
    }

    /// Inserts or replaces a variable wholesale, attributes and all. Used for
    /// `export`/`readonly` builtins and for seeding a subshell's copy.
    pub fn set(&mut self, name: impl Into<String>, var: Variable) {
        self.vars.insert(name.into(), var);
        self.envp_cache.borrow_mut().take();
    }

    pub fn unset(&mut self, name: &str) -> Result<bool, ReadOnlyError> {
        if let Some(v) = self.vars.get(name) {
            if v.read_only {
                return Err(ReadOnlyError {
                        name: name.to_string(),
                    });
            }
        }
        self.envp_cache.borrow_mut().take();
        Ok(self.vars.remove(name).is_some())
    }

    pub fn export(&mut self, name: &str) {
        if let Some(v) = self.vars.get_mut(name) {
            v.exported = true;
            self.envp_cache.borrow_mut().take();
        }
    }

    pub fn mark_read_only(&mut self, name: &str) {
        if let Some(v) = self.vars.get_mut(name) {
            v.read_only = true;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the cached `(name, value)` pairs of every exported variable,
    /// rebuilding the cache first if it was invalidated by a mutation since
    /// the last call.
    pub fn envp(&self) -> Rc<[(Rc<str>, Rc<str>)]> {
        if let Some(cached) = self.envp_cache.borrow().as_ref() {
            return cached.clone();
        }
        let built: Rc<[(Rc<str>, Rc<str>)]> = self
        .vars
        .iter()
        .filter(|(_, v)| v.exported)
        .map(|(k, v)| (Rc::from(k.as_str()), v.value.clone()))
        .collect();
        *self.envp_cache.borrow_mut() = Some(built.clone());
        built
    }
}

impl PartialEq for VariableStore {
    fn eq(&self, other: &Self) -> bool {
        self.vars == other.vars
    }
}
impl Eq for VariableStore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_get() {
        let mut store = VariableStore::new();
        store.assign("x", "1").unwrap();
        assert_eq!(store.get_value("x"), Some("1"));
    }

    #[test]
    fn read_only_rejects_assign() {
        let mut store = VariableStore::new();
        store.assign("x", "1").unwrap();
        store.mark_read_only("x");
        assert!(store.assign("x", "2").is_err());
        assert_eq!(store.get_value("x"), Some("1"));
    }

    #[test]
    fn export_preserved_across_reassign() {
        let mut store = VariableStore::new();
        store.assign("x", "1").unwrap();
        store.export("x");
        store.assign("x", "2").unwrap();
        assert!(store.get("x").unwrap().exported);
    }

    #[test]
    fn envp_reflects_only_exported() {
        let mut store = VariableStore::new();
        store.assign("a", "1").unwrap();
        store.assign("b", "2").unwrap();
        store.export("b");
        let envp = store.envp();
        assert_eq!(envp.len(), 1);
        assert_eq!(&*envp[0].0, "b");
    }
}
