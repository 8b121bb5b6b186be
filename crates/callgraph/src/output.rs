//! Output drivers and the report entry point.
//!
//! Rendering is split between an engine and a driver: the cross-reference and
//! tree writers decide *what* is emitted and in which order, and the selected
//! [`OutputDriver`] decides *how* each event appears in the sink. Drivers are
//! held in a small named registry so the outer program can select a format by
//! name.

use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    error::OutputError,
    filter::SymbolFilter,
    symbol::{SymbolId, SymbolRecord},
    table::SymbolTable,
    tree::tree_output,
    xref::xref_output,
};

/// Upper bound on registered drivers. Registration past this limit is a
/// programmer error and panics.
pub const MAX_OUTPUT_DRIVERS: usize = 8;

/// How much the level-mark buffer grows at a time.
const LEVEL_MARK_INCR: usize = 128;

/// A driver's verdict on one symbol event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descent {
    /// Walk into the symbol's subtree as usual.
    Expand,
    /// Do not descend; the driver already represented the subtree (for
    /// example with a back-reference to an earlier expansion).
    Suppress,
}

/// One symbol line about to be rendered by a driver.
#[derive(Debug)]
pub struct SymbolEvent<'a> {
    /// True in a direct (callee) tree, false in an inverted (caller) tree.
    pub direct: bool,
    /// Depth of the symbol in the tree, root = 0.
    pub level: usize,
    /// True iff no later sibling at this depth will be rendered.
    pub last: bool,
    pub id: SymbolId,
    pub table: &'a SymbolTable,
}

impl SymbolEvent<'_> {
    #[must_use]
    pub fn record(&self) -> &SymbolRecord {
        self.table.symbol(self.id)
    }

    /// The edge list the engine will descend into for this symbol.
    #[must_use]
    pub fn edges(&self) -> &crate::chain::Chain {
        let rec = self.record();
        if self.direct { &rec.callee } else { &rec.caller }
    }
}

/// Rendering state shared between the engine and the driver.
#[derive(Debug)]
pub struct OutputState {
    /// Current output line, 1-based; incremented by every newline event.
    pub out_line: u32,
    marks: Vec<u8>,
}

impl OutputState {
    pub(crate) fn new() -> Self {
        Self {
            out_line: 1,
            marks: vec![0; LEVEL_MARK_INCR],
        }
    }

    /// Records whether more siblings follow at depth `lev`, growing the
    /// buffer in fixed increments as the tree deepens.
    pub(crate) fn set_level_mark(&mut self, lev: usize, mark: bool) {
        while self.marks.len() <= lev {
            self.marks.resize(self.marks.len() + LEVEL_MARK_INCR, 0);
        }
        self.marks[lev] = u8::from(mark);
    }

    /// True when a continuation bar should be drawn at depth `lev`.
    #[must_use]
    pub fn level_mark(&self, lev: usize) -> bool {
        self.marks.get(lev).is_some_and(|&m| m != 0)
    }
}

/// A named output format.
///
/// Every method has a no-op (or obvious) default; `symbol` is the one
/// decision a format must make. Methods receive the sink and the shared
/// [`OutputState`]; the engine owns line accounting and tree walking.
pub trait OutputDriver: fmt::Debug {
    /// Called once before any output.
    fn init(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Called before the tree phase.
    fn begin(&mut self, _out: &mut dyn Write, _state: &OutputState) -> io::Result<()> {
        Ok(())
    }

    /// Called after the tree phase.
    fn end(&mut self, _out: &mut dyn Write, _state: &OutputState) -> io::Result<()> {
        Ok(())
    }

    /// Forces a line break. The engine increments the line counter.
    fn newline(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)
    }

    /// Called between top-level tree roots.
    fn separator(&mut self, _out: &mut dyn Write, _state: &OutputState) -> io::Result<()> {
        Ok(())
    }

    /// Renders one symbol line and decides whether the engine may descend.
    fn symbol(&mut self, out: &mut dyn Write, state: &OutputState, event: &SymbolEvent<'_>) -> io::Result<Descent>;

    /// Emits literal text.
    fn text(&mut self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        out.write_all(text.as_bytes())
    }
}

/// Named driver set, preserving registration order.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: IndexMap<String, Box<dyn OutputDriver>>,
    selected: usize,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a driver under `name` and returns its index. The first
    /// registered driver is selected until [`select`](Self::select) is
    /// called.
    ///
    /// # Panics
    /// Panics when more than [`MAX_OUTPUT_DRIVERS`] drivers are registered.
    pub fn register(&mut self, name: &str, driver: Box<dyn OutputDriver>) -> usize {
        assert!(
            self.drivers.len() < MAX_OUTPUT_DRIVERS,
            "more than {MAX_OUTPUT_DRIVERS} output drivers registered"
        );
        self.drivers.insert_full(name.to_owned(), driver).0
    }

    /// Selects the driver registered under `name`.
    pub fn select(&mut self, name: &str) -> Result<(), OutputError> {
        match self.drivers.get_index_of(name) {
            Some(index) => {
                self.selected = index;
                Ok(())
            }
            None => Err(OutputError::UnknownDriver(name.to_owned())),
        }
    }

    /// Registered driver names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }

    fn selected_mut(&mut self) -> &mut dyn OutputDriver {
        self.drivers
            .get_index_mut(self.selected)
            .expect("no output drivers registered")
            .1
            .as_mut()
    }
}

/// Names of the built-in output formats.
///
/// Parses from and displays as the lowercase driver name used with
/// [`DriverRegistry::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinFormat {
    #[default]
    Gnu,
    Posix,
}

/// Report sink: a file path or standard output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    Path(PathBuf),
}

impl OutputTarget {
    /// Parses the conventional CLI spelling, where `-` means stdout.
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdout
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }
}

/// What to emit and how.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub output: OutputTarget,
    /// Emit the cross-reference listing.
    pub xref: bool,
    /// Emit the call tree.
    pub tree: bool,
    /// Render the inverted (caller) tree instead of the direct one.
    pub reverse: bool,
    /// Root of the direct tree; when unset or unresolved, every included
    /// symbol with callees becomes a root.
    pub start_name: Option<String>,
    /// Maximum tree depth; 0 disables the limit.
    pub max_depth: usize,
    pub filter: SymbolFilter,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            output: OutputTarget::Stdout,
            xref: false,
            tree: true,
            reverse: false,
            start_name: Some("main".to_owned()),
            max_depth: 0,
            filter: SymbolFilter::default(),
        }
    }
}

/// Bundles the sink, the selected driver, and the shared state for one
/// output run.
pub(crate) struct Emitter<'a> {
    out: &'a mut dyn Write,
    driver: &'a mut dyn OutputDriver,
    pub(crate) state: OutputState,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, driver: &'a mut dyn OutputDriver) -> Self {
        Self {
            out,
            driver,
            state: OutputState::new(),
        }
    }

    pub(crate) fn writer(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub(crate) fn init(&mut self) -> io::Result<()> {
        self.driver.init()
    }

    pub(crate) fn begin(&mut self) -> io::Result<()> {
        self.driver.begin(&mut *self.out, &self.state)
    }

    pub(crate) fn end(&mut self) -> io::Result<()> {
        self.driver.end(&mut *self.out, &self.state)
    }

    pub(crate) fn separator(&mut self) -> io::Result<()> {
        self.driver.separator(&mut *self.out, &self.state)
    }

    pub(crate) fn newline(&mut self) -> io::Result<()> {
        self.driver.newline(&mut *self.out)?;
        self.state.out_line += 1;
        Ok(())
    }

    pub(crate) fn symbol(
        &mut self,
        table: &SymbolTable,
        direct: bool,
        level: usize,
        last: bool,
        id: SymbolId,
    ) -> io::Result<Descent> {
        let event = SymbolEvent {
            direct,
            level,
            last,
            id,
            table,
        };
        self.driver.symbol(&mut *self.out, &self.state, &event)
    }
}

impl fmt::Debug for Emitter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").field("state", &self.state).finish()
    }
}

/// Produces the configured reports through the registry's selected driver.
///
/// Opens the sink, emits the cross-reference listing and/or the call tree,
/// and flushes. The table is mutated transiently: the tree writer maintains
/// recursion marks and per-path expansion lines on the records.
pub fn write_reports(
    table: &mut SymbolTable,
    registry: &mut DriverRegistry,
    opts: &OutputOptions,
) -> Result<(), OutputError> {
    let mut sink = open_sink(&opts.output)?;
    write_reports_to(table, registry, opts, &mut *sink)
}

/// [`write_reports`] against a caller-provided sink, ignoring
/// `opts.output`. Useful for capturing reports in memory.
pub fn write_reports_to(
    table: &mut SymbolTable,
    registry: &mut DriverRegistry,
    opts: &OutputOptions,
    out: &mut dyn Write,
) -> Result<(), OutputError> {
    debug!(xref = opts.xref, tree = opts.tree, reverse = opts.reverse, "writing reports");
    let mut em = Emitter::new(out, registry.selected_mut());
    em.init()?;
    if opts.xref {
        xref_output(table, em.writer(), &opts.filter)?;
    }
    if opts.tree {
        tree_output(table, &mut em, opts)?;
    }
    em.writer().flush()?;
    Ok(())
}

fn open_sink(target: &OutputTarget) -> Result<Box<dyn Write>, OutputError> {
    match target {
        OutputTarget::Stdout => Ok(Box::new(BufWriter::new(io::stdout()))),
        OutputTarget::Path(path) => {
            let file = File::create(path).map_err(|source| OutputError::Open {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}
