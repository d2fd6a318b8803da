//! Symbolic register-variable ("regvar") declarations and scope chain.
//!
//! Uses the `cranelift_entity` handle pattern (small `EntityRef` newtypes
//! indexing a [`PrimaryMap`]): a regvar name resolves to a [`RegVarId`]
//! handle once, and every later reference to it is just that handle plus a
//! sub-range, never the string again.
//!
//! Resolving a [`RegVarRef`] to concrete register indices is the external
//! register allocator's job; this module only stores the declarations and
//! scope chain the allocator consumes.

mod scope;

pub use scope::{Scope, ScopeChain, ScopeId, ScopeError};

use crate::isa::RegKind;
use cranelift_entity::{entity_impl, PrimaryMap};

/// Handle to a declared regvar, stable for the lifetime of the
/// [`RegVarTable`] it was declared in.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegVarId(u32);
entity_impl!(RegVarId, "regvar");

/// A `.regvar name:{s|v}[:count]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegVar {
    /// The unqualified name as written (scope prefix lives in the scope
    /// chain, not here).
    pub name: String,
    /// Register file.
    pub kind: RegKind,
    /// Declared width in registers.
    pub count: u8,
}

/// The set of all regvars declared in an assembly job.
#[derive(Debug)]
pub struct RegVarTable {
    vars: PrimaryMap<RegVarId, RegVar>,
}

impl Default for RegVarTable {
    fn default() -> Self {
        RegVarTable {
            vars: PrimaryMap::new(),
        }
    }
}

impl RegVarTable {
    /// An empty table.
    pub fn new() -> Self {
        RegVarTable {
            vars: PrimaryMap::new(),
        }
    }

    /// Declare a new regvar, returning its handle.
    pub fn declare(&mut self, name: impl Into<String>, kind: RegKind, count: u8) -> RegVarId {
        self.vars.push(RegVar {
            name: name.into(),
            kind,
            count,
        })
    }

    /// Look up a previously declared regvar by handle.
    pub fn get(&self, id: RegVarId) -> &RegVar {
        &self.vars[id]
    }

    /// Number of declared regvars.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// A use-site reference to a regvar sub-range, as it appears in an operand
/// position before the register allocator resolves it to concrete indices.
/// Carries `(name, sub-start, sub-end)` until it is resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegVarRef {
    /// The regvar being referenced.
    pub var: RegVarId,
    /// First sub-register index referenced (0 for a whole-regvar use).
    pub sub_start: u8,
    /// One past the last sub-register index referenced.
    pub sub_end: u8,
}

impl RegVarRef {
    /// A reference to the entire regvar.
    pub fn whole(var: RegVarId, table: &RegVarTable) -> RegVarRef {
        RegVarRef {
            var,
            sub_start: 0,
            sub_end: table.get(var).count,
        }
    }

    /// A reference to a single sub-register, `name[i]`.
    pub fn single(var: RegVarId, index: u8) -> RegVarRef {
        RegVarRef {
            var,
            sub_start: index,
            sub_end: index + 1,
        }
    }

    /// A reference to a sub-range, `name[i:j]` (inclusive `j`).
    pub fn range(var: RegVarId, first: u8, last_inclusive: u8) -> RegVarRef {
        RegVarRef {
            var,
            sub_start: first,
            sub_end: last_inclusive + 1,
        }
    }

    /// Width of this reference, in registers.
    pub fn width(&self) -> u8 {
        self.sub_end - self.sub_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_fetch() {
        let mut table = RegVarTable::new();
        let id = table.declare("tmp", RegKind::Vector, 4);
        assert_eq!(table.get(id).count, 4);
        assert_eq!(table.get(id).kind, RegKind::Vector);
    }

    #[test]
    fn whole_and_sub_references() {
        let mut table = RegVarTable::new();
        let id = table.declare("acc", RegKind::Scalar, 8);
        let whole = RegVarRef::whole(id, &table);
        assert_eq!(whole.width(), 8);
        let sub = RegVarRef::range(id, 2, 5);
        assert_eq!(sub.width(), 4);
        let single = RegVarRef::single(id, 3);
        assert_eq!(single.width(), 1);
    }
}
