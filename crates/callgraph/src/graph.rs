//! Call-graph edges and recursion marking.
//!
//! Edges are recorded while the collaborator parses: every reported call adds
//! the callee to the caller's `callee` list and the caller to the callee's
//! `caller` list, so the two lists stay reciprocal. Duplicate edges are
//! suppressed at insert time, which keeps tree output finite and keeps each
//! child list in source textual order of first occurrence.

use smallvec::SmallVec;

use crate::{
    symbol::{SymbolId, SymbolKind},
    table::SymbolTable,
};

enum Visit {
    Enter(SymbolId),
    Exit(SymbolId),
}

impl SymbolTable {
    /// Records a call from `caller` to `callee`, symmetrically.
    ///
    /// Each side is added only if not already present in the respective list.
    pub fn add_call(&mut self, caller: SymbolId, callee: SymbolId) {
        debug_assert!(!self.is_finalized(), "calls reported after cleanup");
        if !self.edges.contains(&self.symbol(caller).callee, &callee) {
            self.edges.push(&mut self.records[caller.index()].callee, callee);
        }
        if !self.edges.contains(&self.symbol(callee).caller, &caller) {
            self.edges.push(&mut self.records[callee.index()].caller, caller);
        }
    }

    /// Marks every symbol lying on a callee-graph cycle as recursive.
    ///
    /// Runs a depth-first scan from each live symbol with a non-empty callee
    /// list; a symbol reached while already on the current path is marked
    /// recursive and not descended into again. The walk uses an explicit
    /// stack so pathological graphs cannot overflow the native stack. All
    /// `active` markers are clear on return.
    pub fn mark_recursion(&mut self) {
        let roots = self.collect(|rec| !rec.callee.is_empty());
        let mut stack: Vec<Visit> = Vec::new();
        for root in roots {
            stack.push(Visit::Enter(root));
            while let Some(visit) = stack.pop() {
                match visit {
                    Visit::Enter(id) => {
                        let rec = self.symbol(id);
                        if rec.kind == SymbolKind::Undefined {
                            continue;
                        }
                        if rec.active {
                            self.symbol_mut(id).recursive = true;
                            continue;
                        }
                        self.symbol_mut(id).active = true;
                        stack.push(Visit::Exit(id));
                        let callees: SmallVec<[SymbolId; 8]> =
                            self.edges.iter(&self.symbol(id).callee).copied().collect();
                        for callee in callees {
                            stack.push(Visit::Enter(callee));
                        }
                    }
                    Visit::Exit(id) => self.symbol_mut(id).active = false,
                }
            }
        }
    }
}
