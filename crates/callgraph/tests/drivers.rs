//! Output driver selection and the built-in formats.

use std::io::{self, Write};

use callgraph::{
    Descent, DriverRegistry, GnuOptions, MAX_OUTPUT_DRIVERS, OutputDriver, OutputError, OutputOptions, OutputState,
    SymbolEvent, SymbolId, SymbolKind, SymbolTable, builtin_registry, write_reports_to,
};
use pretty_assertions::assert_eq;

fn def_fn(table: &mut SymbolTable, name: &str, line: u32) -> SymbolId {
    let id = table.install(name);
    let file = table.current_file();
    let rec = table.symbol_mut(id);
    rec.kind = SymbolKind::Identifier;
    rec.source = file;
    rec.def_line = line;
    rec.arity = Some(0);
    id
}

/// Minimal driver that prints bare names, for registry tests.
#[derive(Debug, Default)]
struct NameOnly;

impl OutputDriver for NameOnly {
    fn symbol(&mut self, out: &mut dyn Write, _state: &OutputState, event: &SymbolEvent<'_>) -> io::Result<Descent> {
        write!(out, "{}", event.record().name)?;
        Ok(Descent::Expand)
    }
}

/// Selecting an unregistered name reports the driver as unknown.
#[test]
fn selecting_unknown_driver_fails() {
    let mut registry = builtin_registry(GnuOptions::default());
    assert!(registry.select("posix").is_ok());
    match registry.select("graphviz") {
        Err(OutputError::UnknownDriver(name)) => assert_eq!(name, "graphviz"),
        other => panic!("expected UnknownDriver, got {other:?}"),
    }
}

/// The registry holds a bounded number of drivers.
#[test]
#[should_panic(expected = "output drivers")]
fn registering_past_capacity_panics() {
    let mut registry = DriverRegistry::new();
    for i in 0..=MAX_OUTPUT_DRIVERS {
        registry.register(&format!("driver{i}"), Box::new(NameOnly));
    }
}

/// A custom driver receives the engine's symbol events.
#[test]
fn custom_driver_renders_through_registry() {
    let mut table = SymbolTable::new();
    table.install_file("main.c", true);
    let main = def_fn(&mut table, "main", 1);
    let a = def_fn(&mut table, "a", 2);
    table.add_call(main, a);
    table.cleanup();
    let mut registry = DriverRegistry::new();
    registry.register("names", Box::new(NameOnly));
    let mut out = Vec::new();
    write_reports_to(&mut table, &mut registry, &OutputOptions::default(), &mut out).expect("report succeeds");
    assert_eq!(String::from_utf8(out).expect("UTF-8"), "main\na\n");
}

/// Line-number and level prefixes from the default driver.
#[test]
fn gnu_prefixes_number_and_level() {
    let mut table = SymbolTable::new();
    table.install_file("main.c", true);
    let main = def_fn(&mut table, "main", 1);
    let a = def_fn(&mut table, "a", 3);
    table.add_call(main, a);
    table.cleanup();
    let gnu = GnuOptions {
        line_numbers: true,
        levels: true,
        ..GnuOptions::default()
    };
    let mut registry = builtin_registry(gnu);
    let mut out = Vec::new();
    write_reports_to(&mut table, &mut registry, &OutputOptions::default(), &mut out).expect("report succeeds");
    let expected = ["    1 {   0} main() <main.c:1>:", "    2 {   1}     a() <main.c:3>", ""].join("\n");
    assert_eq!(String::from_utf8(out).expect("UTF-8"), expected);
}

/// The posix driver never suppresses descent: a repeated symbol's subtree is
/// expanded again in full.
#[test]
fn posix_driver_re_expands_repeats() {
    let mut table = SymbolTable::new();
    table.install_file("main.c", true);
    let main = def_fn(&mut table, "main", 1);
    let a = def_fn(&mut table, "a", 3);
    let b = def_fn(&mut table, "b", 5);
    let c = def_fn(&mut table, "c", 7);
    table.add_call(main, a);
    table.add_call(main, b);
    table.add_call(b, a);
    table.add_call(a, c);
    table.cleanup();
    let mut registry = builtin_registry(GnuOptions::default());
    registry.select("posix").expect("posix is registered");
    let mut out = Vec::new();
    write_reports_to(&mut table, &mut registry, &OutputOptions::default(), &mut out).expect("report succeeds");
    let expected = [
        "    1 main: <main.c 1>",
        "    2     a: <main.c 3>",
        "    3         c: <main.c 7>",
        "    4     b: <main.c 5>",
        "    5         a: <main.c 3>",
        "    6             c: <main.c 7>",
        "",
    ]
    .join("\n");
    assert_eq!(String::from_utf8(out).expect("UTF-8"), expected);
}
