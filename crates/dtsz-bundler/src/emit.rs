//! Bundle text emission.
//!
//! Statements are copied from their source text with a set of
//! non-overlapping text edits applied: renamed declaration names, rewritten
//! references, and rebuilt `export`/`default`/`declare` modifiers.

use crate::collect::{Collection, ImportKind, ImportedBinding, IncludedStatement, StatementKind};
use crate::options::BundleOptions;
use dtsz_binder::{Program, SymbolId};
use dtsz_parser::NodeArena;
use dtsz_parser::syntax_kind_ext::*;
use dtsz_scanner::SyntaxKind;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Write as _;
use tracing::trace;

/// Replace `[start, end)` of a statement's source with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl TextEdit {
    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> Self {
        TextEdit {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }
}

/// A top-level name of a statement and what it became.
#[derive(Debug, Clone)]
pub struct PlannedName {
    pub symbol: SymbolId,
    pub name: String,
    pub preferred: String,
}

/// An included statement with its rename and reference edits.
#[derive(Debug, Clone)]
pub struct PlannedStatement<'c> {
    pub statement: &'c IncludedStatement,
    pub names: Vec<PlannedName>,
    pub edits: Vec<TextEdit>,
}

pub struct BundleEmitter<'p> {
    program: &'p Program,
    options: &'p BundleOptions,
    out: String,
}

impl<'p> BundleEmitter<'p> {
    pub fn new(program: &'p Program, options: &'p BundleOptions) -> Self {
        BundleEmitter {
            program,
            options,
            out: String::with_capacity(4096),
        }
    }

    /// Write the bundle. `import_names` holds the allocated local name of
    /// every imported binding.
    pub fn emit(
        mut self,
        collection: &Collection,
        statements: &[PlannedStatement<'_>],
        import_names: &FxHashMap<SymbolId, String>,
    ) -> String {
        if !self.options.no_banner {
            let _ = writeln!(self.out, "// Generated by dtsz v{}", env!("CARGO_PKG_VERSION"));
            self.out.push('\n');
        }

        let has_imports = !collection.imports.is_empty();
        self.emit_imports(&collection.imports, import_names);
        if has_imports {
            self.out.push('\n');
        }

        let mut exports_by_symbol: FxHashMap<SymbolId, Vec<&str>> = FxHashMap::default();
        for export in &collection.exports {
            exports_by_symbol
                .entry(export.symbol)
                .or_default()
                .push(export.name.as_str());
        }
        let exported_names: FxHashSet<&str> =
            collection.exports.iter().map(|e| e.name.as_str()).collect();

        let mut local_names: FxHashMap<SymbolId, &str> = import_names
            .iter()
            .map(|(symbol, name)| (*symbol, name.as_str()))
            .collect();
        let mut inline_exported: FxHashSet<(SymbolId, &str)> = FxHashSet::default();
        let mut any_inline = false;

        for planned in statements {
            for name in &planned.names {
                local_names.entry(name.symbol).or_insert(name.name.as_str());
            }
            let inline = collection.export_equals.is_none()
                && planned.statement.kind == StatementKind::Declaration
                && !planned.names.is_empty()
                && planned.names.iter().all(|name| {
                    match exports_by_symbol.get(&name.symbol) {
                        Some(exported) => exported.contains(&name.name.as_str()),
                        None => {
                            self.options.export_referenced_types
                                && name.name == name.preferred
                                && !exported_names.contains(name.name.as_str())
                        }
                    }
                });
            if inline {
                any_inline = true;
                for name in &planned.names {
                    inline_exported.insert((name.symbol, name.name.as_str()));
                }
            }
            self.emit_statement(planned, inline);
        }

        let mut tail = Vec::new();
        if let Some(target) = collection.export_equals {
            let local = self.local_name(&local_names, target);
            tail.push(format!("export = {local};"));
        } else {
            let specifiers: Vec<String> = collection
                .exports
                .iter()
                .filter(|e| !inline_exported.contains(&(e.symbol, e.name.as_str())))
                .map(|e| {
                    let local = self.local_name(&local_names, e.symbol);
                    if local == e.name {
                        local
                    } else {
                        format!("{local} as {}", e.name)
                    }
                })
                .collect();
            if !specifiers.is_empty() {
                tail.push(format!("export {{ {} }};", specifiers.join(", ")));
            }
        }
        for specifier in &collection.external_star_exports {
            tail.push(format!("export * from \"{specifier}\";"));
        }
        if tail.is_empty() && !has_imports && !any_inline {
            tail.push("export {};".to_string());
        }

        if !tail.is_empty() {
            if !self.out.is_empty() && !self.out.ends_with("\n\n") {
                self.out.push('\n');
            }
            for line in tail {
                self.out.push_str(&line);
                self.out.push('\n');
            }
        }
        self.out
    }

    fn local_name(&self, local_names: &FxHashMap<SymbolId, &str>, symbol: SymbolId) -> String {
        match local_names.get(&symbol) {
            Some(name) => (*name).to_string(),
            None => self
                .program
                .symbol(symbol)
                .map_or(String::new(), |s| s.escaped_name.clone()),
        }
    }

    /// One import statement per specifier, in first-use order.
    fn emit_imports(
        &mut self,
        imports: &[ImportedBinding],
        import_names: &FxHashMap<SymbolId, String>,
    ) {
        let mut groups: IndexMap<&str, Vec<&ImportedBinding>> = IndexMap::new();
        for binding in imports {
            groups
                .entry(binding.specifier.as_str())
                .or_default()
                .push(binding);
        }

        for (specifier, bindings) in groups {
            let local = |binding: &ImportedBinding| {
                import_names
                    .get(&binding.symbol)
                    .cloned()
                    .unwrap_or_else(|| binding.preferred_name.clone())
            };
            let mut default = None;
            let mut named = Vec::new();
            for binding in bindings {
                match &binding.kind {
                    ImportKind::Namespace => {
                        let _ = writeln!(
                            self.out,
                            "import * as {} from \"{specifier}\";",
                            local(binding)
                        );
                    }
                    ImportKind::Default if default.is_none() => default = Some(local(binding)),
                    ImportKind::Default => named.push(format!("default as {}", local(binding))),
                    ImportKind::Named(name) => {
                        let local = local(binding);
                        if *name == local {
                            named.push(local);
                        } else {
                            named.push(format!("{name} as {local}"));
                        }
                    }
                }
            }
            let clause = match (default, named.is_empty()) {
                (None, true) => continue,
                (Some(default), true) => default,
                (None, false) => format!("{{ {} }}", named.join(", ")),
                (Some(default), false) => format!("{default}, {{ {} }}", named.join(", ")),
            };
            let _ = writeln!(self.out, "import {clause} from \"{specifier}\";");
        }
    }

    fn emit_statement(&mut self, planned: &PlannedStatement<'_>, inline_export: bool) {
        let node_ref = planned.statement.node;
        let Some(arena) = self.program.arena(node_ref.file) else {
            return;
        };
        let Some(node) = arena.get(node_ref.node) else {
            return;
        };
        let text = arena.source_text();
        let start = leading_jsdoc_start(text, node.pos);
        let mut edits = planned.edits.clone();

        if planned.statement.kind == StatementKind::Declaration {
            let mut keyword_search_from = node.pos;
            if let Some(modifiers) = arena.modifiers_of(node_ref.node) {
                for &modifier in &modifiers.nodes {
                    let Some(token) = arena.get(modifier) else {
                        continue;
                    };
                    keyword_search_from = keyword_search_from.max(token.end);
                    if is_rebuilt_modifier(token.kind) {
                        edits.push(TextEdit::replace(token.pos, skip_whitespace(text, token.end), ""));
                    }
                }
            }

            let mut prefix = String::new();
            if inline_export {
                prefix.push_str("export ");
            }
            if needs_declare(node.kind) {
                prefix.push_str("declare ");
            }
            if !prefix.is_empty() {
                edits.push(TextEdit::insert(node.pos, prefix));
            }

            // Anonymous `export default class {}`: the statement is its own name
            if let Some(name) = planned.names.first()
                && planned.statement.names.first() == Some(&node_ref)
                && let Some(at) = keyword_end(text, keyword_search_from)
            {
                edits.push(TextEdit::insert(at, format!(" {}", name.name)));
            }
        }

        let rendered = apply_edits(text, start, node.end, edits);
        trace!(file = node_ref.file.0, pos = node.pos, "emit statement");
        self.out.push_str(&rendered);
        self.out.push('\n');
    }
}

fn is_rebuilt_modifier(kind: u16) -> bool {
    kind == SyntaxKind::ExportKeyword as u16
        || kind == SyntaxKind::DefaultKeyword as u16
        || kind == SyntaxKind::DeclareKeyword as u16
}

/// Declarations that carry a value need `declare` at top level.
fn needs_declare(kind: u16) -> bool {
    matches!(
        kind,
        VARIABLE_STATEMENT
            | FUNCTION_DECLARATION
            | CLASS_DECLARATION
            | ENUM_DECLARATION
            | MODULE_DECLARATION
    )
}

fn skip_whitespace(text: &str, from: u32) -> u32 {
    let rest = text.get(from as usize..).unwrap_or("");
    let trimmed = rest.trim_start();
    from + (rest.len() - trimmed.len()) as u32
}

/// End of the `class`/`function` keyword at or after `from`.
fn keyword_end(text: &str, from: u32) -> Option<u32> {
    let at = skip_whitespace(text, from);
    let rest = text.get(at as usize..)?;
    ["class", "function"]
        .into_iter()
        .find(|keyword| rest.starts_with(keyword))
        .map(|keyword| at + keyword.len() as u32)
}

/// Start of the JSDoc comment directly before `pos`, or `pos`.
pub(crate) fn leading_jsdoc_start(text: &str, pos: u32) -> u32 {
    let Some(before) = text.get(..pos as usize) else {
        return pos;
    };
    let trimmed = before.trim_end();
    if !trimmed.ends_with("*/") {
        return pos;
    }
    let Some(open) = trimmed[..trimmed.len() - 2].rfind("/*") else {
        return pos;
    };
    if trimmed[open..].starts_with("/**") && !trimmed[open + 2..trimmed.len() - 2].contains("*/") {
        open as u32
    } else {
        pos
    }
}

/// Source `[start, end)` with `edits` applied. Edits are applied in position
/// order; an edit overlapping an earlier one is dropped.
pub(crate) fn apply_edits(text: &str, start: u32, end: u32, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|edit| (edit.start, edit.end));
    let mut out = String::with_capacity((end.saturating_sub(start)) as usize + 32);
    let mut cursor = start;
    for edit in edits {
        if edit.start < cursor || edit.end > end {
            continue;
        }
        out.push_str(text.get(cursor as usize..edit.start as usize).unwrap_or(""));
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(text.get(cursor as usize..end as usize).unwrap_or(""));
    out
}

/// Source range of an import type's `import("m").A.B` prefix, up to the end
/// of its qualifier (or closing parenthesis).
pub(crate) fn import_type_head(arena: &NodeArena, node: dtsz_parser::NodeIndex) -> Option<(u32, u32)> {
    let n = arena.get(node)?;
    let import_type = arena.get_import_type(n)?;
    if let Some(qualifier) = arena.get(import_type.qualifier) {
        return Some((n.pos, qualifier.end));
    }
    let argument = arena.get(import_type.argument)?;
    let text = arena.source_text();
    let close = text.get(argument.end as usize..)?.find(')')?;
    Some((n.pos, argument.end + close as u32 + 1))
}
