//! Symbol records and the identifiers used to address them.
//!
//! Every symbol the analyzer knows about lives in one record arena owned by
//! [`SymbolTable`](crate::table::SymbolTable); collaborators hold [`SymbolId`]s
//! instead of references. An id is *slot-stable*: the id first allocated for a
//! name always denotes the currently visible binding of that name, across any
//! amount of scope shadowing. Shadowed bindings are moved to fresh records
//! reachable through the `shadow` chain and are never handed out.

use crate::chain::Chain;

/// Index of a symbol record inside the table's record arena.
///
/// Uses `u32` to keep edge-list cells small; four billion symbols is far more
/// than any translation unit produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("symbol arena exceeds u32 range"))
    }

    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an interned source-file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);

impl FileId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("file intern exceeds u32 range"))
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol record currently is.
///
/// `Undefined` doubles as the tombstone for logically deleted records: scope
/// pops and purges mark a record `Undefined` rather than freeing it, and a
/// later install of the same name reclaims the slot in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolKind {
    /// Undefined or deleted symbol.
    #[default]
    Undefined,
    /// A type name introduced by a typedef.
    Token,
    /// A function or variable.
    Identifier,
}

/// Storage class of an identifier.
///
/// `ExplicitExtern` marks declarations spelled with the `extern` keyword;
/// those belong to some other translation unit and are excluded from
/// cross-reference output and tree roots, unlike ordinary `Extern`
/// definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Storage {
    #[default]
    Extern,
    ExplicitExtern,
    Static,
    Auto,
    Any,
}

/// Lifetime flag attached at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolFlag {
    #[default]
    None,
    /// Installed while a non-canonical (included) file was active; purged at
    /// end of translation unit.
    Temp,
    /// A function parameter awaiting demotion to an ordinary auto.
    Parm,
}

/// One reference site: the file and 1-based line where a symbol was mentioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub file: FileId,
    pub line: u32,
}

/// A symbol table entry.
///
/// Fields are public: the table hands out `&mut SymbolRecord` so the parsing
/// collaborator can populate attributes as it learns them. List heads
/// (`ref_line`, `caller`, `callee`) are chain handles into the table's cell
/// arenas and must only be grown through the table's own methods.
#[derive(Debug, Default)]
pub struct SymbolRecord {
    pub name: String,
    pub kind: SymbolKind,
    pub flag: SymbolFlag,
    pub storage: Storage,
    /// Defining file, once a definition has been seen.
    pub source: Option<FileId>,
    /// Defining line (1-based).
    pub def_line: u32,
    /// Textual declaration, for functions and file-scope variables.
    pub decl: Option<String>,
    /// Block nesting depth for autos; parameter nesting depth for parms.
    pub level: u32,
    /// Parameter count for functions; `None` for variables.
    pub arity: Option<u32>,
    /// Reference sites, in the order they were reported.
    pub ref_line: Chain,
    /// Symbols that call this one.
    pub caller: Chain,
    /// Symbols this one calls.
    pub callee: Chain,
    /// Set by the recursion scan when the symbol lies on a callee-graph cycle.
    pub recursive: bool,
    /// Recursion-scan DFS membership marker. Always `false` outside a scan.
    pub(crate) active: bool,
    /// While the tree writer is expanding this symbol's subtree, the output
    /// line just past the symbol's own line; `0` otherwise. Drivers use it to
    /// emit "recursive: see N" on re-encounters along the current path.
    pub active_line: u32,
    /// Output line recorded at this symbol's first expansion, or `0` if it has
    /// never been expanded. Drivers use it for "[see N]" back-references.
    pub expand_line: u32,
    /// Shadowed outer binding of the same name, if any.
    pub(crate) shadow: Option<SymbolId>,
}

impl SymbolRecord {
    pub(crate) fn fresh(name: &str, flag: SymbolFlag) -> Self {
        Self {
            name: name.to_owned(),
            flag,
            ..Self::default()
        }
    }

    /// True for function symbols (an arity has been recorded).
    #[must_use]
    pub fn is_function(&self) -> bool {
        self.arity.is_some()
    }
}
