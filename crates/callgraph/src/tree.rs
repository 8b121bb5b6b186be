//! Call-tree rendering.
//!
//! A depth-first walk over callee edges (direct mode) or caller edges
//! (inverted mode). The engine decides which nodes are rendered and in what
//! order; the selected driver formats each line. Before any node at depth
//! `lev + 1` is rendered, the engine looks ahead over the remaining siblings
//! to know whether any later one is printable — that single look-ahead yields
//! both the `last` flag handed to the driver and the level mark used for
//! continuation bars, without backtracking.
//!
//! Re-entry into a symbol currently being expanded is cut off by the
//! `active_line` marker, which doubles as the "recursive: see N" target for
//! drivers. Child order is the order calls were recorded in, i.e. source
//! textual order de-duplicated per parent.

use std::io;

use smallvec::SmallVec;

use crate::{
    output::{Descent, Emitter, OutputOptions},
    symbol::{SymbolId, SymbolKind},
    table::SymbolTable,
};

/// Renders the configured call tree through `em`.
pub(crate) fn tree_output(table: &mut SymbolTable, em: &mut Emitter<'_>, opts: &OutputOptions) -> io::Result<()> {
    for rec in &mut table.records {
        rec.active_line = 0;
        rec.expand_line = 0;
    }
    let mut roots = table.collect(|rec| opts.filter.xref_includes(rec));
    roots.sort_unstable_by(|&a, &b| table.symbol(a).name.as_bytes().cmp(table.symbol(b).name.as_bytes()));
    table.mark_recursion();

    em.begin()?;
    if opts.reverse {
        for id in roots {
            render(table, em, opts, false, 0, false, id)?;
            em.separator()?;
        }
    } else if let Some(start) = opts.start_name.as_deref().and_then(|name| table.lookup(name)) {
        render(table, em, opts, true, 0, false, start)?;
        em.separator()?;
    } else {
        for id in roots {
            if table.symbol(id).callee.is_empty() {
                continue;
            }
            render(table, em, opts, true, 0, false, id)?;
            em.separator()?;
        }
    }
    em.end()
}

fn render(
    table: &mut SymbolTable,
    em: &mut Emitter<'_>,
    opts: &OutputOptions,
    direct: bool,
    lev: usize,
    last: bool,
    id: SymbolId,
) -> io::Result<()> {
    let rec = table.symbol(id);
    if rec.kind == SymbolKind::Undefined
        || (opts.max_depth > 0 && lev >= opts.max_depth)
        || !opts.filter.includes(rec)
    {
        return Ok(());
    }

    let verdict = em.symbol(table, direct, lev, last, id)?;
    em.newline()?;
    if verdict == Descent::Suppress || table.symbol(id).active_line != 0 {
        return Ok(());
    }

    let line = em.state.out_line;
    {
        let rec = table.symbol_mut(id);
        rec.active_line = line;
        if rec.expand_line == 0 {
            rec.expand_line = line;
        }
    }

    let chain = {
        let rec = table.symbol(id);
        if direct { rec.callee } else { rec.caller }
    };
    let children: SmallVec<[SymbolId; 8]> = table.edges.iter(&chain).copied().collect();
    for (i, &child) in children.iter().enumerate() {
        let later_printable = children[i + 1..]
            .iter()
            .any(|&sibling| opts.filter.includes(table.symbol(sibling)));
        em.state.set_level_mark(lev + 1, later_printable);
        render(table, em, opts, direct, lev + 1, !later_printable, child)?;
    }

    table.symbol_mut(id).active_line = 0;
    Ok(())
}
