//! Scanning real C source into the table and through the reports.

use callgraph::{
    GnuOptions, OutputError, OutputOptions, OutputTarget, ScanError, ScanOptions, Scanner, Storage, SymbolKind,
    SymbolTable, builtin_registry, write_reports, write_reports_to,
};
use pretty_assertions::assert_eq;

fn scan(code: &str) -> SymbolTable {
    scan_with(code, ScanOptions::default())
}

fn scan_with(code: &str, options: ScanOptions) -> SymbolTable {
    let mut table = SymbolTable::new();
    let mut scanner = Scanner::new(options).expect("C grammar loads");
    scanner.scan_source(&mut table, "test.c", code).expect("source scans");
    table.cleanup();
    table
}

fn callee_names(table: &SymbolTable, name: &str) -> Vec<String> {
    let id = table.lookup(name).expect("symbol exists");
    table.callees(id).map(|&c| table.symbol(c).name.clone()).collect()
}

/// Definitions are recorded with storage, arity, declaration text, and call
/// edges; parameters and locals do not outlive the function.
#[test]
fn definitions_calls_and_scopes() {
    let table = scan(
        "static int helper(int x) {\n\
         \x20   return x + 1;\n\
         }\n\
         \n\
         int main(int argc, char **argv) {\n\
         \x20   int total;\n\
         \x20   total = helper(argc);\n\
         \x20   return total;\n\
         }\n",
    );

    let helper = table.lookup("helper").expect("helper is defined");
    let rec = table.symbol(helper);
    assert_eq!(rec.kind, SymbolKind::Identifier);
    assert_eq!(rec.storage, Storage::Static);
    assert_eq!(rec.arity, Some(1));
    assert_eq!(rec.def_line, 1);
    assert_eq!(rec.decl.as_deref(), Some("int helper(int x)"));

    let main = table.lookup("main").expect("main is defined");
    assert_eq!(table.symbol(main).arity, Some(2));
    assert_eq!(table.symbol(main).storage, Storage::Extern);

    assert_eq!(callee_names(&table, "main"), vec!["helper"]);
    let caller_names: Vec<&str> = table.callers(helper).map(|&c| table.symbol(c).name.as_str()).collect();
    assert_eq!(caller_names, vec!["main"]);
    let ref_lines: Vec<u32> = table.references(helper).map(|r| r.line).collect();
    assert_eq!(ref_lines, vec![7]);

    // Parameters and block locals are gone after their scopes close.
    assert_eq!(table.lookup("argc"), None);
    assert_eq!(table.lookup("argv"), None);
    assert_eq!(table.lookup("total"), None);
    assert_eq!(table.lookup("x"), None);
}

/// A call seen before the definition binds to the same record the definition
/// later fills in, and cycles are marked.
#[test]
fn forward_calls_and_recursion() {
    let mut table = scan(
        "int is_even(int n) {\n\
         \x20   if (n == 0) return 1;\n\
         \x20   return is_odd(n - 1);\n\
         }\n\
         \n\
         int is_odd(int n) {\n\
         \x20   if (n == 0) return 0;\n\
         \x20   return is_even(n - 1);\n\
         }\n",
    );
    table.mark_recursion();
    let even = table.lookup("is_even").expect("defined");
    let odd = table.lookup("is_odd").expect("defined");
    assert!(table.symbol(even).source.is_some());
    assert!(table.symbol(odd).source.is_some());
    assert!(table.symbol(even).recursive);
    assert!(table.symbol(odd).recursive);
    assert_eq!(callee_names(&table, "is_even"), vec!["is_odd"]);
}

/// Calls to functions never defined still enter the graph, without a source.
#[test]
fn library_calls_stay_undefined() {
    let table = scan("int main(void) {\n    printf(\"hi\");\n    return 0;\n}\n");
    let printf = table.lookup("printf").expect("installed by the call");
    let rec = table.symbol(printf);
    assert_eq!(rec.kind, SymbolKind::Identifier);
    assert_eq!(rec.arity, Some(0));
    assert_eq!(rec.source, None);
    assert_eq!(callee_names(&table, "main"), vec!["printf"]);
}

/// Globals-only scanning purges statics at end of file.
#[test]
fn globals_only_drops_statics() {
    let code = "static int helper(void) { return 1; }\n\nint main(void) { return helper(); }\n";
    let table = scan_with(code, ScanOptions { globals_only: true });
    assert_eq!(table.lookup("helper"), None);
    assert!(table.lookup("main").is_some());
}

/// A block-scope variable shadows its file-scope namesake only inside the
/// block.
#[test]
fn block_shadowing_is_undone() {
    let table = scan(
        "int g;\n\
         \n\
         int f(void) {\n\
         \x20   int g;\n\
         \x20   g = 1;\n\
         \x20   return g;\n\
         }\n",
    );
    let g = table.lookup("g").expect("file-scope g remains");
    let rec = table.symbol(g);
    assert_eq!(rec.storage, Storage::Extern);
    assert_eq!(rec.arity, None);
    assert_eq!(rec.def_line, 1);
}

/// Typedefs become token symbols; prototypes record arity without a
/// definition site.
#[test]
fn typedefs_and_prototypes() {
    let table = scan(
        "typedef unsigned long word_t;\n\
         \n\
         int forward(int a, int b);\n\
         \n\
         int main(void) {\n\
         \x20   return forward(1, 2);\n\
         }\n",
    );
    let word = table.lookup("word_t").expect("typedef installed");
    assert_eq!(table.symbol(word).kind, SymbolKind::Token);
    assert_eq!(table.symbol(word).def_line, 1);

    let forward = table.lookup("forward").expect("prototype installed");
    let rec = table.symbol(forward);
    assert_eq!(rec.arity, Some(2));
    assert_eq!(rec.source, None);
    assert_eq!(callee_names(&table, "main"), vec!["forward"]);
}

/// The whole pipeline: scan, then render the direct tree.
#[test]
fn scanned_source_renders_a_tree() {
    let mut table = scan(
        "int b(void) {\n\
         \x20   return 1;\n\
         }\n\
         \n\
         int a(void) {\n\
         \x20   return b();\n\
         }\n\
         \n\
         int main(void) {\n\
         \x20   return a();\n\
         }\n",
    );
    let mut registry = builtin_registry(GnuOptions::default());
    let mut out = Vec::new();
    write_reports_to(&mut table, &mut registry, &OutputOptions::default(), &mut out).expect("report succeeds");
    let expected = [
        "main() <int main(void) at test.c:9>:",
        "    a() <int a(void) at test.c:5>:",
        "        b() <int b(void) at test.c:1>",
        "",
    ]
    .join("\n");
    assert_eq!(String::from_utf8(out).expect("UTF-8"), expected);
}

/// Files are scanned from disk and reports written to a path.
#[test]
fn file_to_file_round() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("prog.c");
    std::fs::write(&src, "int main(void) { return 0; }\n").expect("write source");

    let mut table = SymbolTable::new();
    let mut scanner = Scanner::new(ScanOptions::default()).expect("C grammar loads");
    scanner.scan_file(&mut table, &src).expect("file scans");
    table.cleanup();

    let out_path = dir.path().join("report.txt");
    let opts = OutputOptions {
        output: OutputTarget::Path(out_path.clone()),
        ..OutputOptions::default()
    };
    let mut registry = builtin_registry(GnuOptions::default());
    write_reports(&mut table, &mut registry, &opts).expect("report succeeds");
    let report = std::fs::read_to_string(&out_path).expect("report exists");
    assert!(report.contains("main()"), "unexpected report: {report}");
}

/// Missing inputs and unopenable outputs surface as the right errors.
#[test]
fn io_failures_are_reported() {
    let mut table = SymbolTable::new();
    let mut scanner = Scanner::new(ScanOptions::default()).expect("C grammar loads");
    let missing = std::path::Path::new("no/such/file.c");
    match scanner.scan_file(&mut table, missing) {
        Err(ScanError::Read { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected Read error, got {other:?}"),
    }

    let opts = OutputOptions {
        output: OutputTarget::Path("no/such/dir/report.txt".into()),
        ..OutputOptions::default()
    };
    let mut registry = builtin_registry(GnuOptions::default());
    match write_reports(&mut table, &mut registry, &opts) {
        Err(OutputError::Open { .. }) => {}
        other => panic!("expected Open error, got {other:?}"),
    }
}
