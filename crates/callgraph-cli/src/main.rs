//! Command-line front end for the `callgraph` analyzer.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use callgraph::{
    BuiltinFormat, GnuOptions, OutputOptions, OutputTarget, ScanOptions, Scanner, SymbolFilter, SymbolTable,
    builtin_registry, write_reports,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::FileConfig;

#[derive(Debug, Parser)]
#[command(name = "callgraph", version, about = "Static call-graph analyzer for C sources")]
struct Cli {
    /// C source files to analyze.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output file; `-` means standard output.
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Print the cross-reference listing.
    #[arg(short = 'x', long)]
    xref: bool,

    /// Print the call tree (the default when neither report is requested).
    #[arg(long)]
    tree: bool,

    /// Print the inverted tree: callers instead of callees.
    #[arg(short, long)]
    reverse: bool,

    /// Root of the direct tree; when it does not resolve, every defined
    /// function with callees becomes a root.
    #[arg(short = 'm', long = "main", value_name = "NAME")]
    main_symbol: Option<String>,

    /// Maximum tree depth; 0 means unlimited.
    #[arg(short, long, value_name = "N")]
    depth: Option<usize>,

    /// Output format.
    #[arg(long, value_name = "NAME")]
    format: Option<BuiltinFormat>,

    /// Prefix output lines with their line number.
    #[arg(short = 'n', long)]
    number_lines: bool,

    /// Prefix output lines with the symbol's nesting level.
    #[arg(short = 'l', long)]
    print_levels: bool,

    /// Draw branch marks and continuation bars instead of plain indentation.
    #[arg(short = 'T', long)]
    tree_marks: bool,

    /// Expand each symbol's subtree once; back-reference later occurrences.
    #[arg(short, long)]
    brief: bool,

    /// Purge per-file statics and report only global symbols.
    #[arg(short = 'g', long)]
    globals_only: bool,

    /// Include data symbols in the reports.
    #[arg(long)]
    include_variables: bool,

    /// Include typedef names in the reports.
    #[arg(long)]
    include_typedefs: bool,

    /// Exclude symbols that are never defined, such as library calls.
    #[arg(long)]
    omit_undefined: bool,

    /// Read defaults from this TOML file instead of ./callgraph.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("callgraph: error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let defaults = load_defaults(&cli)?;

    let format = match cli.format {
        Some(format) => format,
        None => match defaults.format.as_deref() {
            Some(name) => name
                .parse()
                .with_context(|| format!("invalid config format `{name}`"))?,
            None => BuiltinFormat::default(),
        },
    };
    let xref = cli.xref || defaults.xref.unwrap_or(false);
    let mut tree = cli.tree || defaults.tree.unwrap_or(false);
    if !xref && !tree {
        tree = true;
    }
    let globals_only = cli.globals_only || defaults.globals_only.unwrap_or(false);
    let filter = SymbolFilter {
        variables: cli.include_variables || defaults.include_variables.unwrap_or(false),
        statics: !globals_only,
        typedefs: cli.include_typedefs || defaults.include_typedefs.unwrap_or(false),
        undefined: !(cli.omit_undefined || defaults.omit_undefined.unwrap_or(false)),
        ..SymbolFilter::default()
    };
    let opts = OutputOptions {
        output: OutputTarget::parse(&cli.output.or(defaults.output).unwrap_or_else(|| "-".to_owned())),
        xref,
        tree,
        reverse: cli.reverse || defaults.reverse.unwrap_or(false),
        start_name: Some(cli.main_symbol.or(defaults.main).unwrap_or_else(|| "main".to_owned())),
        max_depth: cli.depth.or(defaults.depth).unwrap_or(0),
        filter,
    };
    let gnu = GnuOptions {
        line_numbers: cli.number_lines || defaults.number_lines.unwrap_or(false),
        levels: cli.print_levels || defaults.print_levels.unwrap_or(false),
        tree_marks: cli.tree_marks || defaults.tree_marks.unwrap_or(false),
        brief: cli.brief || defaults.brief.unwrap_or(false),
    };

    let mut table = SymbolTable::new();
    let mut scanner = Scanner::new(ScanOptions { globals_only })?;
    for path in &cli.files {
        scanner.scan_file(&mut table, path)?;
    }
    table.cleanup();
    info!(files = cli.files.len(), "scan complete");

    let mut registry = builtin_registry(gnu);
    registry.select(format.into())?;
    write_reports(&mut table, &mut registry, &opts)?;
    Ok(())
}

fn load_defaults(cli: &Cli) -> Result<FileConfig> {
    if let Some(path) = &cli.config {
        return config::load(path);
    }
    let default = Path::new("callgraph.toml");
    if default.exists() {
        config::load(default)
    } else {
        Ok(FileConfig::default())
    }
}
