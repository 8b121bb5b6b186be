#![doc = include_str!("../../../README.md")]

mod chain;
mod error;
mod filter;
mod gnu;
mod graph;
mod output;
mod posix;
mod scan;
mod symbol;
mod table;
mod tree;
mod xref;

pub use crate::{
    chain::{Chain, ChainArena, ChainIter},
    error::{OutputError, ScanError},
    filter::SymbolFilter,
    gnu::{GnuDriver, GnuOptions},
    output::{
        BuiltinFormat, Descent, DriverRegistry, MAX_OUTPUT_DRIVERS, OutputDriver, OutputOptions, OutputState,
        OutputTarget, SymbolEvent, write_reports, write_reports_to,
    },
    posix::PosixDriver,
    scan::{ScanOptions, Scanner},
    symbol::{FileId, Reference, Storage, SymbolFlag, SymbolId, SymbolKind, SymbolRecord},
    table::SymbolTable,
};

/// A [`DriverRegistry`] with both built-in drivers registered, `gnu`
/// selected.
#[must_use]
pub fn builtin_registry(gnu: GnuOptions) -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry.register(BuiltinFormat::Gnu.into(), Box::new(GnuDriver::new(gnu)));
    registry.register(BuiltinFormat::Posix.into(), Box::new(PosixDriver));
    registry
}
