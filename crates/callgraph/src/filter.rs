//! Symbol inclusion predicates.
//!
//! The outer program composes its listing flags into one [`SymbolFilter`];
//! both report writers consult it per symbol, and the cross-reference writer
//! (and tree root collection) further narrow it with
//! [`xref_includes`](SymbolFilter::xref_includes).

use crate::symbol::{Storage, SymbolKind, SymbolRecord};

/// Which symbols the reports include.
///
/// The default matches the analyzer's out-of-the-box behavior: functions,
/// including statics and undefined library calls, but neither data symbols
/// nor type names.
#[derive(Debug, Clone, Copy)]
pub struct SymbolFilter {
    /// Include function symbols.
    pub functions: bool,
    /// Include data symbols (identifiers with no arity).
    pub variables: bool,
    /// Include symbols with static storage.
    pub statics: bool,
    /// Include typedef names.
    pub typedefs: bool,
    /// Include symbols that were referenced or called but never defined.
    pub undefined: bool,
}

impl Default for SymbolFilter {
    fn default() -> Self {
        Self {
            functions: true,
            variables: false,
            statics: true,
            typedefs: false,
            undefined: true,
        }
    }
}

impl SymbolFilter {
    /// The shared per-symbol inclusion predicate.
    #[must_use]
    pub fn includes(&self, rec: &SymbolRecord) -> bool {
        match rec.kind {
            SymbolKind::Undefined => false,
            SymbolKind::Token => self.typedefs,
            SymbolKind::Identifier => {
                if rec.storage == Storage::Static && !self.statics {
                    return false;
                }
                if rec.source.is_none() && !self.undefined {
                    return false;
                }
                if rec.is_function() { self.functions } else { self.variables }
            }
        }
    }

    /// The cross-reference predicate, also used to collect tree roots:
    /// accepted symbols are those passing [`includes`](Self::includes) that
    /// are type names or identifiers with plain extern or static storage.
    /// Explicit-extern declarations belong to another translation unit and
    /// are excluded.
    #[must_use]
    pub fn xref_includes(&self, rec: &SymbolRecord) -> bool {
        if !self.includes(rec) {
            return false;
        }
        match rec.kind {
            SymbolKind::Identifier => matches!(rec.storage, Storage::Extern | Storage::Static),
            _ => true,
        }
    }
}
