//! Error types, separated by pipeline stage.
//!
//! Keeping scan failures distinct from output failures lets the outer program
//! pick exit codes and messages accurately without string matching. Nothing
//! here is recovered from: the analyzer's contract is succeed or terminate.

use std::{fmt, io, path::PathBuf};

/// Error producing a report.
#[derive(Debug)]
pub enum OutputError {
    /// The output file could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// Writing to the output sink failed; partial output may exist.
    Write(io::Error),
    /// No registered driver carries the requested name.
    UnknownDriver(String),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => write!(f, "cannot open file `{}`: {source}", path.display()),
            Self::Write(source) => write!(f, "write error: {source}"),
            Self::UnknownDriver(name) => write!(f, "unknown output driver `{name}`"),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Write(source) => Some(source),
            Self::UnknownDriver(_) => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(source: io::Error) -> Self {
        Self::Write(source)
    }
}

/// Error reading sources into the symbol table.
#[derive(Debug)]
pub enum ScanError {
    /// An input file could not be read.
    Read { path: PathBuf, source: io::Error },
    /// The bundled C grammar is incompatible with the linked tree-sitter
    /// runtime.
    Grammar(tree_sitter::LanguageError),
    /// The parser produced no tree for the file.
    Parse { path: PathBuf },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read `{}`: {source}", path.display()),
            Self::Grammar(source) => write!(f, "C grammar unavailable: {source}"),
            Self::Parse { path } => write!(f, "cannot parse `{}`", path.display()),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Grammar(source) => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

impl From<tree_sitter::LanguageError> for ScanError {
    fn from(source: tree_sitter::LanguageError) -> Self {
        Self::Grammar(source)
    }
}
