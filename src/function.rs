//! Function entities and the function table.
//!
//! Evaluating a `fn` literal mints a fresh entity: the body's entry
//! position in the token stream, the parameter symbols, and a
//! by-value snapshot of the defining frame. Closure values are just
//! `FnId` handles into the table, so entities outlive the frame that
//! defined them.

use crate::frame::Frame;
use crate::memo::CallCache;
use crate::symbol::SymbolId;
use crate::value::{FnId, Value};

/// One function entity.
#[derive(Debug)]
pub struct Function {
    /// Token index of the first body token.
    pub entry: usize,
    /// Whether the body is a `{ ... }` block (as opposed to a bare
    /// expression ended by `;` or an enclosing closer).
    pub braced: bool,
    /// Parameter symbols, in declaration order.
    pub params: Vec<SymbolId>,
    /// Snapshot of the defining frame's occupied slots, copied at
    /// definition time. Seeded into the call frame before arguments.
    pub captured: Vec<(SymbolId, Value)>,
    /// Memoized results keyed on the argument tuple.
    pub cache: CallCache,
    /// Whether this entity may consult its cache. Starts from the
    /// definition site's static verdict; runtime demotion clears it
    /// permanently.
    pub cache_enabled: bool,
}

impl Function {
    /// Create an entity, capturing the defining frame.
    pub fn new(
        entry: usize,
        braced: bool,
        params: Vec<SymbolId>,
        defining_frame: &Frame,
        cache_enabled: bool,
    ) -> Self {
        let captured = defining_frame
            .occupied()
            .map(|(id, value)| (id, value.clone()))
            .collect();
        Self {
            entry,
            braced,
            params,
            captured,
            cache: CallCache::new(),
            cache_enabled,
        }
    }
}

/// Table of every function entity minted during a run.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: Vec<Function>,
}

impl FunctionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning its handle.
    pub fn insert(&mut self, function: Function) -> FnId {
        let id = self.functions.len();
        self.functions.push(function);
        id
    }

    /// Borrow an entity.
    pub fn get(&self, id: FnId) -> &Function {
        &self.functions[id]
    }

    /// Borrow an entity mutably.
    pub fn get_mut(&mut self, id: FnId) -> &mut Function {
        &mut self.functions[id]
    }

    /// Number of entities minted so far.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no entity has been minted yet.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
