//! `FunctionTable`: the shell function name to body-AST mapping backing
//! `ExecutionFrame`'s `functions` resource.
//!
//! Grounded on `yash-env/src/function.rs`'s `FunctionSet` (a name-keyed map
//! of `Rc<Function>`); `posh_syntax::syntax::FunctionDef` already holds the
//! parsed body, so this table only needs to map names to it.

use posh_syntax::syntax::FunctionDef;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FunctionTable(HashMap<String, Rc<FunctionDef>>);

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or redefines a function.
    pub fn define(&mut self, def: Rc<FunctionDef>) {
        self.0.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.0.get(name).cloned()
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<FunctionDef>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
