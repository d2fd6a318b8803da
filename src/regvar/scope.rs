//! The `::`-separated lexical scope chain regvar names resolve through.

use super::{RegVarId, RegVarTable};
use crate::isa::RegKind;
use cranelift_entity::{entity_impl, PrimaryMap};
use std::collections::HashMap;
use std::fmt;

/// Handle to a scope within a [`ScopeChain`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);
entity_impl!(ScopeId, "scope");

/// A resolution failure: the name didn't match any regvar visible from the
/// current scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeError {
    /// The name as written (including any `::` qualification).
    pub name: String,
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "no regvar named '{}' visible here", self.name)
    }
}

/// One lexical scope: a name and a map of regvars declared directly in it.
#[derive(Debug)]
pub struct Scope {
    parent: Option<ScopeId>,
    #[allow(dead_code)]
    name: String,
    vars: HashMap<String, RegVarId>,
    children: HashMap<String, ScopeId>,
}

/// The scope chain the assembler maintains while processing `.regvar`
/// declarations and `name`/`name::sub`-style references: a scoped map keyed
/// by lexical namespace (`::`-separated).
pub struct ScopeChain {
    scopes: PrimaryMap<ScopeId, Scope>,
    root: ScopeId,
    current: ScopeId,
}

impl ScopeChain {
    /// A chain with just the anonymous root scope active.
    pub fn new() -> Self {
        let mut scopes = PrimaryMap::new();
        let root = scopes.push(Scope {
            parent: None,
            name: String::new(),
            vars: HashMap::new(),
            children: HashMap::new(),
        });
        ScopeChain {
            scopes,
            root,
            current: root,
        }
    }

    /// The currently active scope.
    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Enter (creating if necessary) a named child scope of the current
    /// one, and make it current.
    pub fn push_scope(&mut self, name: &str) -> ScopeId {
        if let Some(&existing) = self.scopes[self.current].children.get(name) {
            self.current = existing;
            return existing;
        }
        let id = self.scopes.push(Scope {
            parent: Some(self.current),
            name: name.to_string(),
            vars: HashMap::new(),
            children: HashMap::new(),
        });
        self.scopes[self.current]
            .children
            .insert(name.to_string(), id);
        self.current = id;
        id
    }

    /// Leave the current scope, returning to its parent. A no-op at the
    /// root scope.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Declare `name` in the current scope.
    pub fn declare(
        &mut self,
        table: &mut RegVarTable,
        name: &str,
        kind: RegKind,
        count: u8,
    ) -> RegVarId {
        let id = table.declare(name, kind, count);
        self.scopes[self.current]
            .vars
            .insert(name.to_string(), id);
        id
    }

    /// Resolve a name to a regvar handle. A bare name is searched starting
    /// at the current scope and walking up through parents. A `::`-joined
    /// path is resolved from the root down (`outer::inner::name`).
    pub fn resolve(&self, path: &str) -> Result<RegVarId, ScopeError> {
        if let Some(stripped) = path.strip_prefix("::") {
            return self.resolve_absolute(stripped);
        }
        if path.contains("::") {
            return self.resolve_absolute(path);
        }
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(&var) = self.scopes[id].vars.get(path) {
                return Ok(var);
            }
            scope = self.scopes[id].parent;
        }
        Err(ScopeError {
            name: path.to_string(),
        })
    }

    fn resolve_absolute(&self, path: &str) -> Result<RegVarId, ScopeError> {
        let mut segments = path.split("::").peekable();
        let mut scope = self.root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                return self.scopes[scope]
                    .vars
                    .get(segment)
                    .copied()
                    .ok_or_else(|| ScopeError {
                        name: path.to_string(),
                    });
            }
            scope = *self.scopes[scope].children.get(segment).ok_or_else(|| ScopeError {
                name: path.to_string(),
            })?;
        }
        Err(ScopeError {
            name: path.to_string(),
        })
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_visible_from_nested_scope() {
        let mut chain = ScopeChain::new();
        let mut table = RegVarTable::new();
        let outer = chain.declare(&mut table, "acc", RegKind::Scalar, 1);
        chain.push_scope("inner");
        assert_eq!(chain.resolve("acc").unwrap(), outer);
        chain.pop_scope();
    }

    #[test]
    fn shadowing_prefers_innermost() {
        let mut chain = ScopeChain::new();
        let mut table = RegVarTable::new();
        chain.declare(&mut table, "tmp", RegKind::Scalar, 1);
        chain.push_scope("loop_body");
        let inner = chain.declare(&mut table, "tmp", RegKind::Vector, 2);
        assert_eq!(chain.resolve("tmp").unwrap(), inner);
    }

    #[test]
    fn qualified_path_resolves_from_root() {
        let mut chain = ScopeChain::new();
        let mut table = RegVarTable::new();
        chain.push_scope("kernel");
        let id = chain.declare(&mut table, "state", RegKind::Vector, 4);
        chain.pop_scope();
        assert_eq!(chain.resolve("kernel::state").unwrap(), id);
    }

    #[test]
    fn unknown_name_fails() {
        let chain = ScopeChain::new();
        assert!(chain.resolve("nope").is_err());
    }
}
