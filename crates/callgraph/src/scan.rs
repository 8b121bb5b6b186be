//! Source scanner: turns C files into symbol-table events.
//!
//! Walks the tree-sitter C grammar and reports what it finds to the table:
//! function definitions and prototypes, file-scope and block-scope variables,
//! typedefs, references, and call edges. Scope boundaries map onto the
//! table's lifetime operations — parameters are installed with the parameter
//! flag and demoted with `move_parms` at body entry, block locals die with
//! `delete_autos` when their block closes, and statics are purged per file by
//! `delete_statics`.
//!
//! Input is taken as written: there is no preprocessing, includes are not
//! expanded, and every input file is its own canonical translation unit. A
//! file that parses with errors is still walked; tree-sitter yields a
//! best-effort tree.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};
use tree_sitter::{Node, Parser};

use crate::{
    error::ScanError,
    symbol::{Storage, SymbolFlag, SymbolId, SymbolKind},
    table::SymbolTable,
};

/// Scanner behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Purge static symbols at end of each file, keeping only globals across
    /// translation units.
    pub globals_only: bool,
}

/// A reusable C scanner feeding one [`SymbolTable`].
pub struct Scanner {
    parser: Parser,
    options: ScanOptions,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner").field("options", &self.options).finish()
    }
}

impl Scanner {
    /// Creates a scanner with the bundled C grammar loaded.
    pub fn new(options: ScanOptions) -> Result<Self, ScanError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c::LANGUAGE.into())?;
        Ok(Self { parser, options })
    }

    /// Reads and scans one file.
    pub fn scan_file(&mut self, table: &mut SymbolTable, path: &Path) -> Result<(), ScanError> {
        let code = fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_owned(),
            source,
        })?;
        self.scan_source(table, &path.display().to_string(), &code)
    }

    /// Scans in-memory source under the given file label.
    pub fn scan_source(&mut self, table: &mut SymbolTable, name: &str, code: &str) -> Result<(), ScanError> {
        debug!(file = name, bytes = code.len(), "scanning");
        table.install_file(name, true);
        let tree = self
            .parser
            .parse(code, None)
            .ok_or_else(|| ScanError::Parse {
                path: PathBuf::from(name),
            })?;

        let mut walk = FileWalk {
            table: &mut *table,
            src: code.as_bytes(),
        };
        walk.top_level(tree.root_node());
        table.delete_statics(self.options.globals_only);
        Ok(())
    }
}

/// Walk state for a single file.
struct FileWalk<'a> {
    table: &'a mut SymbolTable,
    src: &'a [u8],
}

impl FileWalk<'_> {
    fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.src).unwrap_or_default()
    }

    /// The visible binding of `name`, installing one if none exists.
    ///
    /// File-scope entities reuse their record across declaration, call, and
    /// definition, so edges recorded before the definition is seen stay
    /// attached. Locals and parameters deliberately bypass this and install
    /// shadowing bindings instead.
    fn get_or_install(&mut self, name: &str) -> SymbolId {
        match self.table.lookup(name) {
            Some(id) => id,
            None => self.table.install(name),
        }
    }

    fn line(node: Node<'_>) -> u32 {
        u32::try_from(node.start_position().row).unwrap_or(u32::MAX).saturating_add(1)
    }

    /// Declaration text with source whitespace collapsed.
    fn decl_text(&self, node: Node<'_>) -> String {
        let type_text = node.child_by_field_name("type").map_or("", |n| self.text(n));
        let declarator_text = node.child_by_field_name("declarator").map_or("", |n| self.text(n));
        let joined = format!("{type_text} {declarator_text}");
        joined.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn storage_class(&self, node: Node<'_>) -> Option<&str> {
        for i in 0..node.child_count() {
            let child = node.child(i)?;
            if child.kind() == "storage_class_specifier" {
                return Some(self.text(child));
            }
        }
        None
    }

    fn top_level(&mut self, root: Node<'_>) {
        for i in 0..root.named_child_count() {
            let Some(node) = root.named_child(i) else { continue };
            match node.kind() {
                "function_definition" => self.function_definition(node),
                "declaration" => self.file_scope_declaration(node),
                "type_definition" => self.type_definition(node),
                _ => {}
            }
        }
    }

    fn function_definition(&mut self, node: Node<'_>) {
        let Some(declarator) = node.child_by_field_name("declarator") else { return };
        let Some(func_decl) = function_declarator(declarator) else { return };
        let Some(ident) = func_decl
            .child_by_field_name("declarator")
            .and_then(declared_identifier)
        else {
            return;
        };
        let name = self.text(ident).to_owned();
        let storage = match self.storage_class(node) {
            Some("static") => Storage::Static,
            _ => Storage::Extern,
        };
        let decl = self.decl_text(node);
        let line = Self::line(ident);
        let params = self.parameters(func_decl);
        trace!(function = name.as_str(), line, arity = params.len(), "definition");

        let id = self.get_or_install(&name);
        let file = self.table.current_file();
        let rec = self.table.symbol_mut(id);
        rec.kind = SymbolKind::Identifier;
        rec.storage = storage;
        rec.source = file;
        rec.def_line = line;
        rec.decl = Some(decl);
        rec.arity = Some(u32::try_from(params.len()).unwrap_or(u32::MAX));

        for (pname, pline) in params {
            let pid = self.table.install(&pname);
            let rec = self.table.symbol_mut(pid);
            rec.kind = SymbolKind::Identifier;
            rec.storage = Storage::Auto;
            rec.flag = SymbolFlag::Parm;
            rec.level = 1;
            rec.def_line = pline;
            rec.source = file;
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.table.move_parms(1);
            self.enter_block(body, id, 1);
        } else {
            self.table.delete_parms(0);
        }
    }

    /// Parameter names of a function declarator, skipping `void` and unnamed
    /// parameters.
    fn parameters(&self, func_decl: Node<'_>) -> Vec<(String, u32)> {
        let mut out = Vec::new();
        let Some(list) = func_decl.child_by_field_name("parameters") else {
            return out;
        };
        for i in 0..list.named_child_count() {
            let Some(param) = list.named_child(i) else { continue };
            if param.kind() != "parameter_declaration" {
                continue;
            }
            if let Some(ident) = param.child_by_field_name("declarator").and_then(declared_identifier) {
                out.push((self.text(ident).to_owned(), Self::line(ident)));
            }
        }
        out
    }

    /// Visits the statements of one block at nesting level `level`, then
    /// deletes the block's autos.
    fn enter_block(&mut self, block: Node<'_>, current_fn: SymbolId, level: u32) {
        for i in 0..block.named_child_count() {
            let Some(node) = block.named_child(i) else { continue };
            self.visit(node, current_fn, level);
        }
        self.table.delete_autos(level);
    }

    /// Generic statement/expression walk inside a function body.
    fn visit(&mut self, node: Node<'_>, current_fn: SymbolId, level: u32) {
        match node.kind() {
            "compound_statement" => self.enter_block(node, current_fn, level + 1),
            "declaration" => self.local_declaration(node, current_fn, level),
            "call_expression" => self.call(node, current_fn, level),
            "identifier" => self.reference(node),
            _ => {
                for i in 0..node.named_child_count() {
                    let Some(child) = node.named_child(i) else { continue };
                    self.visit(child, current_fn, level);
                }
            }
        }
    }

    fn call(&mut self, node: Node<'_>, current_fn: SymbolId, level: u32) {
        if let Some(callee_node) = node.child_by_field_name("function") {
            if callee_node.kind() == "identifier" {
                let name = self.text(callee_node).to_owned();
                let line = Self::line(callee_node);
                let callee = self.get_or_install(&name);
                let rec = self.table.symbol_mut(callee);
                if rec.kind == SymbolKind::Undefined {
                    rec.kind = SymbolKind::Identifier;
                }
                if rec.arity.is_none() {
                    // Whatever it was declared as, it is being called.
                    rec.arity = Some(0);
                }
                self.table.add_reference(callee, line);
                self.table.add_call(current_fn, callee);
            } else {
                self.visit(callee_node, current_fn, level);
            }
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.visit(args, current_fn, level);
        }
    }

    /// A mention of an already-known symbol in expression context.
    fn reference(&mut self, node: Node<'_>) {
        let line = Self::line(node);
        if let Some(id) = self.table.lookup(self.text(node)) {
            self.table.add_reference(id, line);
        }
    }

    fn local_declaration(&mut self, node: Node<'_>, current_fn: SymbolId, level: u32) {
        let storage = match self.storage_class(node) {
            Some("static") => Storage::Static,
            Some("extern") => Storage::ExplicitExtern,
            _ => Storage::Auto,
        };
        self.each_declarator(node, |walk, declarator| {
            if let Some(ident) = declared_identifier(declarator) {
                let name = walk.text(ident).to_owned();
                let line = Self::line(ident);
                let is_function = function_declarator(declarator).is_some();
                let id = walk.table.install(&name);
                let file = walk.table.current_file();
                let rec = walk.table.symbol_mut(id);
                rec.kind = SymbolKind::Identifier;
                rec.def_line = line;
                rec.source = file;
                if is_function {
                    // Block-scope prototype: the function lives elsewhere.
                    rec.storage = Storage::ExplicitExtern;
                    rec.arity = Some(0);
                } else {
                    rec.storage = storage;
                    rec.level = level;
                }
            }
        });
        // Initializer expressions may contain calls and references.
        self.each_init_value(node, |walk, value| walk.visit(value, current_fn, level));
    }

    fn file_scope_declaration(&mut self, node: Node<'_>) {
        let storage_kw = self.storage_class(node).map(str::to_owned);
        self.each_declarator(node, |walk, declarator| {
            let Some(ident) = declared_identifier(declarator) else { return };
            let name = walk.text(ident).to_owned();
            let line = Self::line(ident);
            if let Some(func_decl) = function_declarator(declarator) {
                // Prototype: record the signature but not a definition site.
                let arity = walk.parameters(func_decl).len();
                let id = walk.get_or_install(&name);
                let rec = walk.table.symbol_mut(id);
                rec.kind = SymbolKind::Identifier;
                rec.storage = match storage_kw.as_deref() {
                    Some("static") => Storage::Static,
                    Some("extern") => Storage::ExplicitExtern,
                    _ => Storage::Extern,
                };
                rec.arity = Some(u32::try_from(arity).unwrap_or(u32::MAX));
            } else {
                let decl = walk.decl_text(node);
                let id = walk.get_or_install(&name);
                let file = walk.table.current_file();
                let rec = walk.table.symbol_mut(id);
                rec.kind = SymbolKind::Identifier;
                rec.storage = match storage_kw.as_deref() {
                    Some("static") => Storage::Static,
                    Some("extern") => Storage::ExplicitExtern,
                    _ => Storage::Extern,
                };
                rec.source = file;
                rec.def_line = line;
                rec.decl = Some(decl);
            }
        });
    }

    fn type_definition(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();
        for declarator in declarators {
            let Some(ident) = declared_type_identifier(declarator) else { continue };
            let name = self.text(ident).to_owned();
            let line = Self::line(ident);
            let id = self.get_or_install(&name);
            let file = self.table.current_file();
            let rec = self.table.symbol_mut(id);
            rec.kind = SymbolKind::Token;
            rec.source = file;
            rec.def_line = line;
        }
    }

    /// Applies `f` to every declarator of a declaration node, unwrapping
    /// `init_declarator` wrappers.
    fn each_declarator(&mut self, node: Node<'_>, mut f: impl FnMut(&mut Self, Node<'_>)) {
        for i in 0..node.named_child_count() {
            let Some(child) = node.named_child(i) else { continue };
            match child.kind() {
                "init_declarator" => {
                    if let Some(inner) = child.child_by_field_name("declarator") {
                        f(self, inner);
                    }
                }
                "identifier" | "pointer_declarator" | "array_declarator" | "function_declarator"
                | "parenthesized_declarator" => f(self, child),
                _ => {}
            }
        }
    }

    /// Applies `f` to every initializer value of a declaration node.
    fn each_init_value(&mut self, node: Node<'_>, mut f: impl FnMut(&mut Self, Node<'_>)) {
        for i in 0..node.named_child_count() {
            let Some(child) = node.named_child(i) else { continue };
            if child.kind() == "init_declarator" {
                if let Some(value) = child.child_by_field_name("value") {
                    f(self, value);
                }
            }
        }
    }
}

/// Descends through pointer/array/parenthesized wrappers to the function
/// declarator, if this declarator declares a function.
fn function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node;
    loop {
        match cursor.kind() {
            "function_declarator" => return Some(cursor),
            "pointer_declarator" | "array_declarator" => {
                cursor = cursor.child_by_field_name("declarator")?;
            }
            "parenthesized_declarator" => cursor = cursor.named_child(0)?,
            _ => return None,
        }
    }
}

/// The type name a typedef declarator introduces, if any.
fn declared_type_identifier(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "type_identifier" => Some(node),
        "pointer_declarator" | "array_declarator" | "function_declarator" => {
            declared_type_identifier(node.child_by_field_name("declarator")?)
        }
        "parenthesized_declarator" => declared_type_identifier(node.named_child(0)?),
        _ => None,
    }
}

/// The identifier a declarator introduces, if any.
fn declared_identifier(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "identifier" => Some(node),
        "pointer_declarator" | "array_declarator" | "function_declarator" | "init_declarator" => {
            declared_identifier(node.child_by_field_name("declarator")?)
        }
        "parenthesized_declarator" => declared_identifier(node.named_child(0)?),
        _ => None,
    }
}
