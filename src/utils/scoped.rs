//! Scoped symbol table.
//!
//! [`ScopedTable`] is a stack of hash maps: bindings added while a scope is open
//! shadow bindings of enclosing scopes and disappear again when the scope is
//! closed. SSA renaming opens one scope per region while walking the dominator
//! tree, so a region's definitions are visible exactly to the regions it dominates.

use std::{collections::HashMap, hash::Hash};

/// A stack of nested binding scopes.
///
/// Lookups search from the innermost scope outwards and return the first binding
/// found. Adding a key that is already bound in the innermost scope replaces that
/// binding, which is how a later definition in the same region shadows an earlier one.
///
/// # Examples
///
/// ```rust
/// use regssa::utils::ScopedTable;
///
/// let mut table: ScopedTable<u32, &str> = ScopedTable::new();
/// table.open_scope();
/// table.add(0, "outer");
///
/// table.open_scope();
/// table.add(0, "inner");
/// assert_eq!(table.lookup(&0), Some(&"inner"));
/// table.close_scope();
///
/// assert_eq!(table.lookup(&0), Some(&"outer"));
/// ```
#[derive(Debug, Clone)]
pub struct ScopedTable<K, V> {
    scopes: Vec<HashMap<K, V>>,
}

impl<K, V> Default for ScopedTable<K, V> {
    fn default() -> Self {
        ScopedTable { scopes: Vec::new() }
    }
}

impl<K: Hash + Eq, V> ScopedTable<K, V> {
    /// Creates a table without any open scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new innermost scope.
    pub fn open_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Closes the innermost scope, discarding its bindings.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open. Unbalanced scopes mean the caller's walk is broken.
    pub fn close_scope(&mut self) {
        assert!(
            self.scopes.pop().is_some(),
            "closed a scope of an empty scoped table"
        );
    }

    /// Binds `key` to `value` in the innermost scope.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn add(&mut self, key: K, value: V) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(key, value);
            }
            None => panic!("added a binding to a scoped table without an open scope"),
        }
    }

    /// Returns the innermost binding of `key`, if any scope binds it.
    #[must_use]
    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.scopes.iter().rev().find_map(|scope| scope.get(key))
    }

    /// Returns the number of open scopes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
