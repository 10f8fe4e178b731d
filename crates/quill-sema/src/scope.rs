//! The lexical scope tree.
//!
//! Scopes form a forest with one designated global scope. Each scope owns
//! a symbol table mapping names to `SymbolId`s; tables preserve insertion
//! order so wildcard imports copy deterministically.

use indexmap::IndexMap;

use crate::symbol::{Symbol, SymbolArena, SymbolId};

/// Index of a scope in its [`ScopeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    symbols: IndexMap<String, SymbolId>,
    pub children: Vec<ScopeId>,
}

impl Scope {
    #[must_use]
    pub fn symbols(&self) -> &IndexMap<String, SymbolId> {
        &self.symbols
    }
}

/// Result of a typed lookup: the narrowed match, if the bound symbol had
/// the requested category, plus whatever symbol the name is bound to (for
/// "a <kind> with that name already exists" messages).
#[derive(Debug, Clone, Copy)]
pub struct NarrowedLookup {
    pub matched: Option<SymbolId>,
    pub existing: Option<SymbolId>,
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            ..Scope::default()
        });
        if let Some(parent) = parent {
            self.scopes[parent.index()].children.push(id);
        }
        id
    }

    #[must_use]
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Bind `name` in `scope`. On a collision the existing binding is
    /// returned unchanged.
    pub fn insert(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        symbol: SymbolId,
    ) -> Result<(), SymbolId> {
        let name = name.into();
        let table = &mut self.scopes[scope.index()].symbols;
        if let Some(&existing) = table.get(&name) {
            return Err(existing);
        }
        table.insert(name, symbol);
        Ok(())
    }

    /// Look `name` up in `scope`'s own table only.
    #[must_use]
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.index()].symbols.get(name).copied()
    }

    /// Look `name` up in `scope` and its ancestors, chasing aliases.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str, symbols: &SymbolArena) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(found) = self.lookup_local(id, name) {
                return Some(symbols.chase_alias(found));
            }
            current = self.scopes[id.index()].parent;
        }
        None
    }

    /// Look `name` up and narrow to the symbols accepted by `pred`.
    #[must_use]
    pub fn lookup_narrowed(
        &self,
        scope: ScopeId,
        name: &str,
        symbols: &SymbolArena,
        pred: impl Fn(&Symbol) -> bool,
    ) -> NarrowedLookup {
        match self.lookup(scope, name, symbols) {
            Some(found) if pred(symbols.get(found)) => NarrowedLookup {
                matched: Some(found),
                existing: Some(found),
            },
            Some(found) => NarrowedLookup {
                matched: None,
                existing: Some(found),
            },
            None => NarrowedLookup {
                matched: None,
                existing: None,
            },
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
