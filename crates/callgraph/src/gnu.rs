//! The default, human-readable output format.
//!
//! Each symbol line carries the name, `()` for functions, the definition site
//! in angle brackets, and recursion annotations. Indentation is four plain
//! spaces per level, or branch marks and continuation bars when the tree
//! decoration is enabled:
//!
//! ```text
//! +-main() <int main(int argc, char **argv) at main.c:3>:
//!   +-parse() <int parse(void) at main.c:11>:
//!   | \-next_token()
//!   \-emit()
//! ```

use std::io::{self, Write};

use crate::output::{Descent, OutputDriver, OutputState, SymbolEvent};

/// Formatting knobs for [`GnuDriver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GnuOptions {
    /// Prefix every line with the current output line number.
    pub line_numbers: bool,
    /// Prefix every line with the symbol's nesting level.
    pub levels: bool,
    /// Draw branch heads and continuation bars instead of plain indentation.
    pub tree_marks: bool,
    /// Expand each symbol's subtree only once; later occurrences print a
    /// `[see N]` back-reference instead.
    pub brief: bool,
}

/// The analyzer's default output driver.
#[derive(Debug, Default)]
pub struct GnuDriver {
    options: GnuOptions,
}

impl GnuDriver {
    #[must_use]
    pub fn new(options: GnuOptions) -> Self {
        Self { options }
    }

    fn print_level(&self, out: &mut dyn Write, state: &OutputState, lev: usize, last: bool) -> io::Result<()> {
        if self.options.line_numbers {
            write!(out, "{:5} ", state.out_line)?;
        }
        if self.options.levels {
            write!(out, "{{{lev:4}}} ")?;
        }
        let (indent, end) = if self.options.tree_marks {
            (["  ", "| "], ["+-", "\\-"])
        } else {
            (["    ", "    "], ["", ""])
        };
        for i in 0..lev {
            out.write_all(indent[usize::from(state.level_mark(i))].as_bytes())?;
        }
        out.write_all(end[usize::from(last)].as_bytes())?;
        Ok(())
    }
}

impl OutputDriver for GnuDriver {
    fn symbol(&mut self, out: &mut dyn Write, state: &OutputState, event: &SymbolEvent<'_>) -> io::Result<Descent> {
        let rec = event.record();
        self.print_level(out, state, event.level, event.last)?;
        write!(out, "{}", rec.name)?;
        if rec.is_function() {
            write!(out, "()")?;
        }
        if let Some(file) = rec.source {
            write!(out, " <")?;
            if let Some(decl) = &rec.decl {
                write!(out, "{decl} at ")?;
            }
            write!(out, "{}:{}>", event.table.file(file), rec.def_line)?;
        }
        if !event.edges().is_empty() {
            if rec.active_line != 0 {
                write!(out, " (recursive: see {})", rec.active_line)?;
                return Ok(Descent::Expand);
            }
            if self.options.brief && rec.expand_line != 0 {
                write!(out, " [see {}]", rec.expand_line)?;
                return Ok(Descent::Suppress);
            }
            if rec.recursive {
                write!(out, " (R)")?;
            }
            write!(out, ":")?;
        }
        Ok(Descent::Expand)
    }
}
