//! The global symbol table.
//!
//! One hashed index maps each name to its *slot*: the record holding the
//! currently visible binding. Installing a name that is already bound moves
//! the old binding's contents to a fresh record linked through the slot's
//! shadow chain, so ids held by the parsing collaborator keep meaning "the
//! visible binding of this name" while nested scopes come and go. Deleting
//! pops the shadow chain back into the slot, or marks the slot `Undefined`
//! when nothing is shadowed; the tombstone is reclaimed in place by the next
//! install of the name.
//!
//! Scope sweeps (`delete_autos`, `delete_parms`, `move_parms`,
//! `delete_statics`) examine visible bindings only, which is sound because
//! installs are LIFO: the deepest binding in every chain is the innermost
//! scope's. `collect` and the recursion scan, by contrast, walk full shadow
//! chains.

use ahash::AHashMap;

use crate::{
    chain::{ChainArena, ChainIter},
    symbol::{FileId, Reference, Storage, SymbolFlag, SymbolId, SymbolKind, SymbolRecord},
};

/// Symbol store for one analyzer run.
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub(crate) records: Vec<SymbolRecord>,
    index: AHashMap<String, SymbolId>,
    files: Vec<String>,
    file_index: AHashMap<String, FileId>,
    current_file: Option<FileId>,
    canonical_file: Option<FileId>,
    pub(crate) edges: ChainArena<SymbolId>,
    pub(crate) refs: ChainArena<Reference>,
    finalized: bool,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the input file subsequent symbols come from.
    ///
    /// The first canonical file of a translation unit becomes the unit's
    /// root; symbols installed while a different, non-canonical file is
    /// active receive the [`SymbolFlag::Temp`] flag and are purged by
    /// [`delete_statics`](Self::delete_statics).
    pub fn install_file(&mut self, path: &str, canonical: bool) -> FileId {
        let id = self.intern_file(path);
        self.current_file = Some(id);
        if canonical {
            self.canonical_file = Some(id);
        }
        id
    }

    fn intern_file(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.file_index.get(path) {
            return id;
        }
        let id = FileId::new(self.files.len());
        self.files.push(path.to_owned());
        self.file_index.insert(path.to_owned(), id);
        id
    }

    /// Path of an interned file.
    #[must_use]
    pub fn file(&self, id: FileId) -> &str {
        &self.files[id.index()]
    }

    /// File currently being read, if any.
    #[must_use]
    pub fn current_file(&self) -> Option<FileId> {
        self.current_file
    }

    /// Returns the visible binding of `name`, if one exists and has not been
    /// deleted.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let id = *self.index.get(name)?;
        (self.records[id.index()].kind != SymbolKind::Undefined).then_some(id)
    }

    /// Installs a fresh `Undefined` record for `name` and returns its id.
    ///
    /// A pre-existing `Undefined` visible binding is overwritten in place,
    /// reclaiming its slot. Otherwise the old binding's contents move to a
    /// new record pushed onto the slot's shadow chain and the slot is reset
    /// for the new binding, so the returned id is the same one earlier
    /// installs of `name` produced.
    pub fn install(&mut self, name: &str) -> SymbolId {
        assert!(!name.is_empty(), "symbol names must be non-empty");
        let flag = match (self.current_file, self.canonical_file) {
            (Some(cur), Some(canon)) if cur != canon => SymbolFlag::Temp,
            _ => SymbolFlag::None,
        };
        if let Some(&slot) = self.index.get(name) {
            let fresh = SymbolRecord::fresh(name, flag);
            if self.records[slot.index()].kind == SymbolKind::Undefined {
                // A tombstone never shadows anything; reuse it outright.
                debug_assert!(self.records[slot.index()].shadow.is_none());
                self.records[slot.index()] = fresh;
            } else {
                let saved = std::mem::replace(&mut self.records[slot.index()], fresh);
                let saved_id = SymbolId::new(self.records.len());
                self.records.push(saved);
                self.records[slot.index()].shadow = Some(saved_id);
            }
            return slot;
        }
        let id = SymbolId::new(self.records.len());
        self.records.push(SymbolRecord::fresh(name, flag));
        self.index.insert(name.to_owned(), id);
        id
    }

    /// Shared view of a record.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &SymbolRecord {
        &self.records[id.index()]
    }

    /// Mutable view of a record, for the collaborator's attribute setters.
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut SymbolRecord {
        &mut self.records[id.index()]
    }

    /// Appends a reference site to a symbol's reference list.
    pub fn add_reference(&mut self, id: SymbolId, line: u32) {
        debug_assert!(!self.finalized, "references reported after cleanup");
        let Some(file) = self.current_file else { return };
        self.refs
            .push(&mut self.records[id.index()].ref_line, Reference { file, line });
    }

    /// Iterates a symbol's reference sites.
    pub fn references(&self, id: SymbolId) -> ChainIter<'_, Reference> {
        self.refs.iter(&self.records[id.index()].ref_line)
    }

    /// Iterates the symbols `id` calls, in recorded order.
    pub fn callees(&self, id: SymbolId) -> ChainIter<'_, SymbolId> {
        self.edges.iter(&self.records[id.index()].callee)
    }

    /// Iterates the symbols calling `id`, in recorded order.
    pub fn callers(&self, id: SymbolId) -> ChainIter<'_, SymbolId> {
        self.edges.iter(&self.records[id.index()].caller)
    }

    /// Deletes the binding at `id`: pops the shadow chain into the slot, or
    /// marks the record `Undefined` when nothing is shadowed.
    pub fn delete(&mut self, id: SymbolId) {
        match self.records[id.index()].shadow {
            Some(shadow) => {
                let moved = std::mem::take(&mut self.records[shadow.index()]);
                self.records[id.index()] = moved;
            }
            None => self.records[id.index()].kind = SymbolKind::Undefined,
        }
    }

    fn sweep_visible(&mut self, mut action: impl FnMut(&mut Self, SymbolId)) {
        let slots: Vec<SymbolId> = self.index.values().copied().collect();
        for slot in slots {
            action(self, slot);
        }
    }

    /// Deletes every auto variable at the given block nesting level.
    pub fn delete_autos(&mut self, level: u32) {
        self.sweep_visible(|table, slot| {
            let rec = &table.records[slot.index()];
            if rec.kind == SymbolKind::Identifier && rec.storage == Storage::Auto && rec.level == level {
                table.delete(slot);
            }
        });
    }

    /// Deletes every saved parameter with parameter nesting level greater
    /// than `level`.
    pub fn delete_parms(&mut self, level: u32) {
        self.sweep_visible(|table, slot| {
            let rec = &table.records[slot.index()];
            if rec.kind == SymbolKind::Identifier
                && rec.storage == Storage::Auto
                && rec.flag == SymbolFlag::Parm
                && rec.level > level
            {
                table.delete(slot);
            }
        });
    }

    /// Redeclares all saved parameters as ordinary autos at the given block
    /// nesting level.
    pub fn move_parms(&mut self, level: u32) {
        for rec in self.visible_records_mut() {
            if rec.kind == SymbolKind::Identifier && rec.storage == Storage::Auto && rec.flag == SymbolFlag::Parm {
                rec.level = level;
                rec.flag = SymbolFlag::None;
            }
        }
    }

    /// End-of-translation-unit purge.
    ///
    /// With `globals_only` set, every static identifier is deleted; install()
    /// is LIFO, so the deepest static in each chain is the current file's and
    /// no per-symbol source check is needed. Temp-flagged symbols from
    /// included files are always deleted.
    pub fn delete_statics(&mut self, globals_only: bool) {
        if globals_only {
            self.sweep_visible(|table, slot| {
                let rec = &table.records[slot.index()];
                if rec.kind == SymbolKind::Identifier && rec.storage == Storage::Static {
                    table.delete(slot);
                }
            });
        }
        self.sweep_visible(|table, slot| {
            if table.records[slot.index()].flag == SymbolFlag::Temp {
                table.delete(slot);
            }
        });
    }

    fn visible_records_mut(&mut self) -> impl Iterator<Item = &mut SymbolRecord> {
        let index = &self.index;
        self.records
            .iter_mut()
            .enumerate()
            .filter(move |(i, rec)| index.get(&rec.name) == Some(&SymbolId::new(*i)))
            .map(|(_, rec)| rec)
    }

    /// Collects the ids of all live records satisfying `sel`, walking every
    /// slot and its shadow chain. Iteration order is unspecified; callers
    /// sort.
    pub fn collect(&self, mut sel: impl FnMut(&SymbolRecord) -> bool) -> Vec<SymbolId> {
        let mut out = Vec::new();
        for &slot in self.index.values() {
            let mut cursor = Some(slot);
            while let Some(id) = cursor {
                let rec = &self.records[id.index()];
                if sel(rec) {
                    out.push(id);
                }
                cursor = rec.shadow;
            }
        }
        out
    }

    /// Finalizes the table after parsing: list handles are frozen and no
    /// further references or call edges may be reported. Idempotent.
    pub fn cleanup(&mut self) {
        self.finalized = true;
    }

    pub(crate) fn is_finalized(&self) -> bool {
        self.finalized
    }
}
