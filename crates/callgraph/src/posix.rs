//! Flat, line-number-oriented output format.
//!
//! Every line starts with its own output line number. Definitions show the
//! declaration and the definition site as `decl, <file line>`; undefined
//! symbols show `<>`. The driver never suppresses descent: a repeated symbol
//! is expanded again in full, and cycles are cut by the engine's own guard.

use std::io::{self, Write};

use crate::output::{Descent, OutputDriver, OutputState, SymbolEvent};

/// Flat driver with numbered lines.
#[derive(Debug, Default)]
pub struct PosixDriver;

impl OutputDriver for PosixDriver {
    fn symbol(&mut self, out: &mut dyn Write, state: &OutputState, event: &SymbolEvent<'_>) -> io::Result<Descent> {
        let rec = event.record();
        write!(out, "{:5} ", state.out_line)?;
        for _ in 0..event.level {
            write!(out, "    ")?;
        }
        write!(out, "{}: ", rec.name)?;
        match rec.source {
            Some(file) => {
                if let Some(decl) = &rec.decl {
                    write!(out, "{decl}, ")?;
                }
                write!(out, "<{} {}>", event.table.file(file), rec.def_line)?;
            }
            None => write!(out, "<>")?,
        }
        Ok(Descent::Expand)
    }
}
