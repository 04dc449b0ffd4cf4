//! Alias definitions used to rewrite command words before they are tokenized
//! further.
//!
//! The parser itself never performs alias substitution; it asks a
//! [`Glossary`] for the replacement text of a word that appears in a
//! command-name position and, if one is found, splices the replacement back
//! into the input stream before continuing to lex. This is the mechanism
//! §4.2 refers to as "see §4.7".

use std::collections::HashMap;
use std::rc::Rc;

/// A single alias definition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    /// The name that triggers substitution.
    pub name: String,
    /// The text that replaces the name.
    pub replacement: String,
    /// Whether the replacement text may itself introduce further command
    /// names subject to alias substitution (true for all aliases defined
        /// with a trailing blank in their replacement, per POSIX).
    pub global: bool,
}

/// Read-only view of a set of aliases, consulted by the lexer/parser driver.
pub trait Glossary {
    /// Looks up an alias by name.
    fn lookup(&self, name: &str) -> Option<Rc<Alias>>;
}

/// A [`Glossary`] that has no aliases.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyGlossary;

impl Glossary for EmptyGlossary {
    fn lookup(&self, _name: &str) -> Option<Rc<Alias>> {
        None
    }
}

/// A mutable table of aliases, the concrete `Glossary` a shell keeps in its
/// execution frame.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    aliases: HashMap<String, Rc<Alias>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or redefines an alias.
    pub fn define(&mut self, name: impl Into<String>, replacement: impl Into<String>) {
        let name = name.into();
        let replacement = replacement.into();
        let global = replacement.ends_with(' ') || replacement.ends_with('\t');
        self.aliases.insert(
            name.clone(),
            Rc::new(Alias {
                    name,
                    replacement,
                    global,
                }),
        );
    }

    /// Removes an alias definition. Returns `true` if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.aliases.remove(name).is_some()
    }

    /// Removes all alias definitions.
    pub fn clear(&mut self) {
        self.aliases.clear();
    }

    /// Iterates over all defined aliases in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Alias>> {
        self.aliases.values()
    }
}

impl Glossary for AliasTable {
    fn lookup(&self, name: &str) -> Option<Rc<Alias>> {
        self.aliases.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut table = AliasTable::new();
        table.define("ll", "ls -l ");
        let alias = table.lookup("ll").unwrap();
        assert_eq!(alias.replacement, "ls -l ");
        assert!(alias.global);
        assert!(table.lookup("missing").is_none());
    }

    #[test]
    fn non_global_alias() {
        let mut table = AliasTable::new();
        table.define("x", "echo hi");
        assert!(!table.lookup("x").unwrap().global);
    }

    #[test]
    fn remove() {
        let mut table = AliasTable::new();
        table.define("a", "b");
        assert!(table.remove("a"));
        assert!(!table.remove("a"));
        assert!(table.lookup("a").is_none());
    }
}
