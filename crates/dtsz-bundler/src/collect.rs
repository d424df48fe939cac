//! Declaration collection.
//!
//! Starting from the entry module's exports, follows every reference of every
//! included statement to the symbol it denotes and includes the top-level
//! statement declaring it. Names imported from outside the bundle (external
//! packages and `declare module "m" {}` blocks) become imports instead. Lib
//! and global symbols are never included.

use crate::graph::ModuleGraph;
use crate::options::BundleOptions;
use dtsz_binder::{FileId, NodeRef, Program, SymbolId, symbol_flags};
use dtsz_common::diagnostics::diagnostic_messages;
use dtsz_common::{Diagnostic, diagnostic_codes, format_message};
use dtsz_parser::syntax_kind_ext::*;
use dtsz_parser::{NodeArena, NodeIndex, node_flags};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// How a name is imported from outside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    Named(String),
    Default,
    Namespace,
}

/// An import statement entry of the bundle.
#[derive(Debug, Clone)]
pub struct ImportedBinding {
    pub specifier: String,
    pub kind: ImportKind,
    pub symbol: SymbolId,
    /// Name the allocator starts from
    pub preferred_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Declaration,
    /// `declare global {}`, copied as written
    GlobalAugmentation,
    /// `declare module "m" {}`, copied as written
    AmbientModule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Identifier,
    QualifiedName,
    ImportType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub node: NodeRef,
    pub kind: ReferenceKind,
}

/// A top-level statement of a bundled file that goes into the output.
#[derive(Debug, Clone)]
pub struct IncludedStatement {
    pub node: NodeRef,
    pub kind: StatementKind,
    /// Declaration names to register; the statement itself for an anonymous
    /// `export default` declaration
    pub names: Vec<NodeRef>,
    pub references: Vec<Reference>,
}

/// An export of the entry module.
#[derive(Debug, Clone)]
pub struct EntryExport {
    pub name: String,
    pub symbol: SymbolId,
}

#[derive(Debug, Default)]
pub struct Collection {
    /// In emission order
    pub statements: Vec<IncludedStatement>,
    /// In discovery order
    pub imports: Vec<ImportedBinding>,
    pub exports: Vec<EntryExport>,
    /// Target of the entry's `export =`
    pub export_equals: Option<SymbolId>,
    pub external_star_exports: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Where a declaration sits in its file.
enum Placement {
    /// Under this top-level statement
    File(NodeRef),
    /// Under this top-level statement of `declare module "specifier" {}`
    AmbientModule { specifier: String, statement: NodeRef },
    /// Inside `declare global {}`
    Global,
}

pub struct DeclarationCollector<'p> {
    program: &'p Program,
    graph: &'p ModuleGraph,
    options: &'p BundleOptions,
    included: IndexMap<NodeRef, IncludedStatement>,
    pending: VecDeque<NodeRef>,
    imports: IndexMap<SymbolId, ImportedBinding>,
    visited_symbols: FxHashSet<SymbolId>,
    diagnostics: Vec<Diagnostic>,
}

impl<'p> DeclarationCollector<'p> {
    pub fn new(program: &'p Program, graph: &'p ModuleGraph, options: &'p BundleOptions) -> Self {
        DeclarationCollector {
            program,
            graph,
            options,
            included: IndexMap::new(),
            pending: VecDeque::new(),
            imports: IndexMap::new(),
            visited_symbols: FxHashSet::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn collect(mut self, entry: FileId) -> Collection {
        let mut exports = Vec::new();
        let mut export_equals = None;
        for (name, export) in self.program.module_exports(entry) {
            let target = self.program.resolve_alias(export);
            if self.program.symbol_flags(target) & symbol_flags::ALIAS != 0
                && self.program.external_import(target).is_none()
            {
                self.report_export(
                    export,
                    diagnostic_messages::UNRESOLVED_EXPORT,
                    diagnostic_codes::UNRESOLVED_EXPORT,
                    &name,
                );
                continue;
            }
            if self.program.module_file(target).is_some() {
                self.report_export(
                    export,
                    diagnostic_messages::UNSUPPORTED_EXPORT,
                    diagnostic_codes::UNSUPPORTED_EXPORT,
                    &name,
                );
                continue;
            }
            let hint = match name.as_str() {
                "default" | "export=" => "",
                other => other,
            };
            self.include_symbol(target, hint);
            if name == "export=" {
                export_equals = Some(target);
            } else {
                exports.push(EntryExport { name, symbol: target });
            }
        }

        self.include_augmentations();

        while let Some(statement) = self.pending.pop_front() {
            let references = self.references_of(statement);
            for reference in &references {
                self.include_reference(*reference);
            }
            if let Some(included) = self.included.get_mut(&statement) {
                included.references = references;
            }
        }

        let statements = self.ordered_statements();
        debug!(
            statements = statements.len(),
            imports = self.imports.len(),
            exports = exports.len(),
            "collected declarations"
        );
        Collection {
            statements,
            imports: self.imports.into_values().collect(),
            exports,
            export_equals,
            external_star_exports: self.program.external_star_exports(entry),
            diagnostics: self.diagnostics,
        }
    }

    fn report_export(&mut self, export: SymbolId, template: &str, code: u32, name: &str) {
        let program = self.program;
        let decl = program.symbol(export).and_then(|s| s.first_declaration());
        let (file, start, length) = match decl {
            Some(decl) => {
                let span = program
                    .arena(decl.file)
                    .and_then(|arena| arena.get(decl.node))
                    .map_or((0, 0), |n| (n.pos, n.end.saturating_sub(n.pos)));
                let file = program.file(decl.file).map_or(String::new(), |f| f.file_name.clone());
                (file, span.0, span.1)
            }
            None => (String::new(), 0, 0),
        };
        self.diagnostics.push(Diagnostic::warning(
            file,
            start,
            length,
            format_message(template, &[name]),
            code,
        ));
    }

    /// `declare global {}` and `declare module "m" {}` blocks of bundled files.
    fn include_augmentations(&mut self) {
        if !self.options.inline_declare_global && !self.options.inline_declare_externals {
            return;
        }
        let program = self.program;
        for module in self.graph.modules() {
            let Some(arena) = program.arena(module.file) else {
                continue;
            };
            let Some(statements) = arena.statements_of(arena.source_file_index()) else {
                continue;
            };
            for &stmt in &statements.nodes {
                let kind = match ambient_block_kind(arena, stmt) {
                    Some(StatementKind::GlobalAugmentation) if self.options.inline_declare_global => {
                        StatementKind::GlobalAugmentation
                    }
                    Some(StatementKind::AmbientModule) if self.options.inline_declare_externals => {
                        StatementKind::AmbientModule
                    }
                    _ => continue,
                };
                let node = NodeRef::new(module.file, stmt);
                if !self.included.contains_key(&node) {
                    self.included.insert(
                        node,
                        IncludedStatement {
                            node,
                            kind,
                            names: Vec::new(),
                            references: Vec::new(),
                        },
                    );
                    self.pending.push_back(node);
                }
            }
        }
    }

    /// Include what `symbol` needs: its declaring statements, or an import.
    fn include_symbol(&mut self, symbol: SymbolId, hint: &str) {
        if !self.visited_symbols.insert(symbol) {
            return;
        }
        let program = self.program;

        if let Some(external) = program.external_import(symbol) {
            let kind = match external.name.as_deref() {
                None => ImportKind::Namespace,
                Some("default") => ImportKind::Default,
                Some(name) => ImportKind::Named(name.to_string()),
            };
            let preferred_name = match &kind {
                ImportKind::Named(name) => name.clone(),
                _ => local_name_hint(hint, &external.specifier),
            };
            self.add_import(ImportedBinding {
                specifier: external.specifier.clone(),
                kind,
                symbol,
                preferred_name,
            });
            return;
        }
        if program.is_global_namespace(symbol)
            || program.is_lib_symbol(symbol)
            || program.is_global_symbol(symbol)
            || program.module_file(symbol).is_some()
        {
            trace!(symbol = symbol.0, "not bundled");
            return;
        }
        if program.symbol_flags(symbol) & symbol_flags::ALIAS != 0 {
            // Unresolved import; nothing to include
            return;
        }
        let Some(sym) = program.symbol(symbol) else {
            return;
        };
        if let Some(specifier) = sym
            .first_declaration()
            .and_then(|decl| ambient_module_name(program, decl))
        {
            self.add_import(ImportedBinding {
                preferred_name: local_name_hint(hint, &specifier),
                specifier,
                kind: ImportKind::Namespace,
                symbol,
            });
            return;
        }

        for decl in sym.declarations.iter().copied() {
            if program.is_lib_file(decl.file) {
                continue;
            }
            match placement(program, decl) {
                Some(Placement::File(statement)) => self.include_statement(statement),
                Some(Placement::AmbientModule {
                    specifier,
                    statement,
                }) => {
                    let Some(outer) = program.symbol_at(statement) else {
                        continue;
                    };
                    let name = program
                        .symbol(outer)
                        .map_or(String::new(), |s| s.escaped_name.clone());
                    self.visited_symbols.insert(outer);
                    self.add_import(ImportedBinding {
                        specifier,
                        kind: ImportKind::Named(name.clone()),
                        symbol: outer,
                        preferred_name: name,
                    });
                }
                Some(Placement::Global) | None => {}
            }
        }
    }

    fn add_import(&mut self, binding: ImportedBinding) {
        trace!(specifier = %binding.specifier, kind = ?binding.kind, "import binding");
        self.imports.entry(binding.symbol).or_insert(binding);
    }

    fn include_statement(&mut self, statement: NodeRef) {
        if self.included.contains_key(&statement) {
            return;
        }
        let Some(arena) = self.program.arena(statement.file) else {
            return;
        };
        let Some(node) = arena.get(statement.node) else {
            return;
        };
        if !is_declaration_statement(node.kind) {
            return;
        }
        let names = declaration_names(arena, statement.node)
            .into_iter()
            .map(|name| NodeRef::new(statement.file, name))
            .collect();
        self.included.insert(
            statement,
            IncludedStatement {
                node: statement,
                kind: StatementKind::Declaration,
                names,
                references: Vec::new(),
            },
        );
        self.pending.push_back(statement);
    }

    fn include_reference(&mut self, reference: Reference) {
        let program = self.program;
        let Some(arena) = program.arena(reference.node.file) else {
            return;
        };
        let hint_node = match reference.kind {
            ReferenceKind::ImportType => arena
                .get(reference.node.node)
                .and_then(|n| arena.get_import_type(n))
                .map_or(NodeIndex::NONE, |it| {
                    dtsz_binder::program::leftmost_identifier(arena, it.qualifier)
                }),
            _ => dtsz_binder::program::leftmost_identifier(arena, reference.node.node),
        };
        let hint = arena.identifier_text(hint_node).unwrap_or("").to_string();

        if let Some(symbol) = program.symbol_at(reference.node) {
            self.include_symbol(program.resolve_alias(symbol), &hint);
        }
        if reference.kind == ReferenceKind::QualifiedName {
            let leftmost = NodeRef::new(reference.node.file, hint_node);
            if let Some(symbol) = program.symbol_at(leftmost) {
                self.include_symbol(program.resolve_alias(symbol), &hint);
            }
        }
    }

    /// Reference nodes under a statement, in source order.
    fn references_of(&self, statement: NodeRef) -> Vec<Reference> {
        let mut references = Vec::new();
        let Some(arena) = self.program.arena(statement.file) else {
            return references;
        };
        let mut stack = vec![statement.node];
        while let Some(idx) = stack.pop() {
            let Some(node) = arena.get(idx) else {
                continue;
            };
            let entity = match node.kind {
                TYPE_REFERENCE => arena.get_type_ref(node).map(|d| d.type_name),
                EXPRESSION_WITH_TYPE_ARGUMENTS => {
                    arena.get_expr_with_type_args(node).map(|d| d.expression)
                }
                TYPE_QUERY => arena.get_type_query(node).map(|d| d.expr_name),
                COMPUTED_PROPERTY_NAME => arena.get_wrapped(node).map(|d| d.inner),
                IMPORT_EQUALS_DECLARATION => {
                    arena.get_import_equals(node).map(|d| d.module_reference)
                }
                IMPORT_TYPE => {
                    references.push(Reference {
                        node: NodeRef::new(statement.file, idx),
                        kind: ReferenceKind::ImportType,
                    });
                    None
                }
                _ => None,
            };
            if let Some(entity) = entity
                && let Some(kind) = entity_reference_kind(arena, entity)
            {
                references.push(Reference {
                    node: NodeRef::new(statement.file, entity),
                    kind,
                });
            }
            let mut children = arena.children_of(idx);
            children.reverse();
            stack.extend(children);
        }
        references
    }

    /// Included statements in module emission order, then source order.
    fn ordered_statements(&mut self) -> Vec<IncludedStatement> {
        let rank: FxHashMap<FileId, usize> = self
            .graph
            .emission_order()
            .into_iter()
            .enumerate()
            .filter_map(|(rank, id)| self.graph.get_module(id).map(|m| (m.file, rank)))
            .collect();
        let mut statements: Vec<IncludedStatement> =
            std::mem::take(&mut self.included).into_values().collect();
        let program = self.program;
        statements.sort_by_key(|s| {
            let rank = rank.get(&s.node.file).copied().unwrap_or(usize::MAX);
            let pos = program
                .arena(s.node.file)
                .and_then(|arena| arena.get(s.node.node))
                .map_or(0, |n| n.pos);
            (rank, pos)
        });

        if self.options.sort_nodes {
            statements.sort_by_cached_key(|s| {
                let name = s.names.first().map(|n| program.node_text(*n).to_string());
                (name.is_none(), name)
            });
        }
        statements
    }
}

fn entity_reference_kind(arena: &NodeArena, entity: NodeIndex) -> Option<ReferenceKind> {
    let node = arena.get(entity)?;
    if node.is_identifier() {
        Some(ReferenceKind::Identifier)
    } else if node.kind == QUALIFIED_NAME {
        Some(ReferenceKind::QualifiedName)
    } else {
        None
    }
}

/// `declare global {}` or `declare module "m" {}` statement kinds.
fn ambient_block_kind(arena: &NodeArena, stmt: NodeIndex) -> Option<StatementKind> {
    let node = arena.get(stmt)?;
    if node.kind != MODULE_DECLARATION {
        return None;
    }
    if node.flags & node_flags::GLOBAL_AUGMENTATION != 0 {
        return Some(StatementKind::GlobalAugmentation);
    }
    let module = arena.get_module(node)?;
    arena
        .get(module.name)
        .is_some_and(|name| name.is_string_literal())
        .then_some(StatementKind::AmbientModule)
}

/// Specifier of a `declare module "m" {}` declaration.
fn ambient_module_name(program: &Program, decl: NodeRef) -> Option<String> {
    let arena = program.arena(decl.file)?;
    match ambient_block_kind(arena, decl.node)? {
        StatementKind::AmbientModule => {
            let module = arena.get_module(arena.get(decl.node)?)?;
            arena.literal_text(module.name).map(str::to_string)
        }
        _ => None,
    }
}

fn placement(program: &Program, decl: NodeRef) -> Option<Placement> {
    let arena = program.arena(decl.file)?;
    let mut current = decl.node;
    loop {
        let parent = arena.parent_of(current);
        let parent_node = arena.get(parent)?;
        match parent_node.kind {
            SOURCE_FILE => return Some(Placement::File(NodeRef::new(decl.file, current))),
            MODULE_BLOCK => {
                let block_owner = arena.parent_of(parent);
                match ambient_block_kind(arena, block_owner) {
                    Some(StatementKind::GlobalAugmentation) => return Some(Placement::Global),
                    Some(StatementKind::AmbientModule) => {
                        let module = arena.get_module(arena.get(block_owner)?)?;
                        return Some(Placement::AmbientModule {
                            specifier: arena.literal_text(module.name)?.to_string(),
                            statement: NodeRef::new(decl.file, current),
                        });
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        current = parent;
    }
}

/// Name nodes a top-level declaration statement introduces.
fn declaration_names(arena: &NodeArena, stmt: NodeIndex) -> Vec<NodeIndex> {
    let Some(node) = arena.get(stmt) else {
        return Vec::new();
    };
    if node.kind == VARIABLE_STATEMENT {
        let mut names = Vec::new();
        if let Some(variable) = arena.get_variable(node) {
            for &decl in &variable.declarations.nodes {
                binding_names(arena, arena.declaration_name(decl), &mut names);
            }
        }
        return names;
    }
    match arena.declaration_name(stmt) {
        name if name.is_none() => vec![stmt],
        name => vec![name],
    }
}

fn binding_names(arena: &NodeArena, name: NodeIndex, out: &mut Vec<NodeIndex>) {
    let Some(node) = arena.get(name) else {
        return;
    };
    if node.is_identifier() {
        out.push(name);
        return;
    }
    if let Some(pattern) = arena.get_binding_pattern(node) {
        for &element in &pattern.elements.nodes {
            binding_names(arena, arena.declaration_name(element), out);
        }
    }
}

/// Identifier-safe local name for a namespace or default import.
fn local_name_hint(hint: &str, specifier: &str) -> String {
    if !hint.is_empty() {
        return hint.to_string();
    }
    let base = specifier
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(specifier);
    let mut name: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_hint() {
        assert_eq!(local_name_hint("React", "react"), "React");
        assert_eq!(local_name_hint("", "react-dom/client"), "client");
        assert_eq!(local_name_hint("", "@scope/my-pkg"), "my_pkg");
        assert_eq!(local_name_hint("", "3d"), "_3d");
    }
}
