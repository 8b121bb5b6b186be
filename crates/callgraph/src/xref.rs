//! Cross-reference listing.
//!
//! One text line per definition and per reference, sorted by symbol name.
//! Writes to the sink directly; the driver machinery is not involved.

use std::io::{self, Write};

use crate::{filter::SymbolFilter, symbol::SymbolKind, table::SymbolTable};

pub(crate) fn xref_output(table: &SymbolTable, out: &mut dyn Write, filter: &SymbolFilter) -> io::Result<()> {
    let mut ids = table.collect(|rec| filter.xref_includes(rec));
    ids.sort_unstable_by(|&a, &b| table.symbol(a).name.as_bytes().cmp(table.symbol(b).name.as_bytes()));

    for id in ids {
        let rec = table.symbol(id);
        match rec.kind {
            SymbolKind::Identifier => {
                if let Some(file) = rec.source {
                    write!(out, "{} * {}:{}", rec.name, table.file(file), rec.def_line)?;
                    if let Some(decl) = &rec.decl {
                        write!(out, " {decl}")?;
                    }
                    writeln!(out)?;
                }
                for reference in table.references(id) {
                    writeln!(out, "{}   {}:{}", rec.name, table.file(reference.file), reference.line)?;
                }
            }
            SymbolKind::Token => {
                if let Some(file) = rec.source {
                    writeln!(out, "{} t {}:{}", rec.name, table.file(file), rec.def_line)?;
                }
            }
            SymbolKind::Undefined => {}
        }
    }
    Ok(())
}
