//! Program: all files of a bundle bound into one symbol space.
//!
//! The `ProgramBuilder` parses files (from strings or from disk, following
//! relative imports) and the embedded lib. `build` binds everything with one
//! `BinderState` and runs a link pass that resolves every module specifier.
//! Module specifiers that do not name a program file or an ambient module are
//! external: each gets one synthetic module symbol, and each name imported
//! from it one synthetic export symbol, so two imports of the same external
//! entity share an identity.
//!
//! Alias and qualified-name resolution is lazy and read-only.

use crate::lib_loader::{self, LibFile, merge_lib_symbols};
use crate::module_resolver::{ModuleResolver, Resolution, is_relative_specifier, normalize_path};
use crate::state::BinderState;
use crate::symbols::{FileId, NodeRef, Symbol, SymbolId, SymbolTable, symbol_flags};
use dtsz_common::Diagnostic;
use dtsz_common::limits::{MAX_ALIAS_CHAIN_DEPTH, MAX_PROGRAM_FILES};
use dtsz_parser::syntax_kind_ext::*;
use dtsz_parser::{NodeArena, NodeIndex, ParserState};
use dtsz_scanner::SyntaxKind;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span, trace, warn};

/// A parsed file of the program.
pub struct SourceFile {
    pub id: FileId,
    pub file_name: String,
    pub arena: NodeArena,
    /// Parse diagnostics
    pub diagnostics: Vec<Diagnostic>,
    pub is_lib: bool,
}

/// What a module specifier resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleTarget {
    File(FileId),
    /// `declare module "m" {}` somewhere in the program
    Ambient(SymbolId),
    /// Not part of the bundle
    External(String),
}

/// Synthetic symbol standing for something imported from an external module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalImport {
    pub specifier: String,
    /// `None` for the module itself (namespace imports)
    pub name: Option<String>,
}

struct ParsedFile {
    file_name: String,
    arena: NodeArena,
    diagnostics: Vec<Diagnostic>,
}

impl ParsedFile {
    fn parse(file_name: String, source_text: String) -> ParsedFile {
        let mut parser = ParserState::new(file_name.clone(), source_text);
        parser.parse_source_file();
        let diagnostics = parser.get_diagnostics().to_vec();
        ParsedFile {
            file_name,
            arena: parser.into_arena(),
            diagnostics,
        }
    }
}

/// Collects the files of a program.
pub struct ProgramBuilder {
    files: Vec<ParsedFile>,
    include_default_lib: bool,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        ProgramBuilder::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> ProgramBuilder {
        ProgramBuilder {
            files: Vec::new(),
            include_default_lib: true,
        }
    }

    /// Add a file from source text. A file name already present is ignored.
    pub fn add_file(
        &mut self,
        file_name: impl AsRef<Path>,
        source_text: impl Into<String>,
    ) -> &mut Self {
        let file_name = normalize_path(file_name.as_ref())
            .to_string_lossy()
            .into_owned();
        if self.files.iter().any(|f| f.file_name == file_name) {
            return self;
        }
        self.files
            .push(ParsedFile::parse(file_name, source_text.into()));
        self
    }

    /// Skip the embedded lib; only `globalThis` is predeclared.
    pub fn without_default_lib(&mut self) -> &mut Self {
        self.include_default_lib = false;
        self
    }

    /// Load entry files from disk, then every file reachable through
    /// relative module specifiers.
    pub fn load_from_disk(&mut self, entries: &[PathBuf]) -> std::io::Result<&mut Self> {
        let mut resolver = ModuleResolver::disk();
        let mut seen: FxHashSet<PathBuf> = self
            .files
            .iter()
            .map(|f| PathBuf::from(&f.file_name))
            .collect();
        let mut queue: VecDeque<PathBuf> = entries.iter().map(|p| normalize_path(p)).collect();

        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }
            if self.files.len() >= MAX_PROGRAM_FILES {
                warn!(limit = MAX_PROGRAM_FILES, "program file limit reached");
                break;
            }
            let text = std::fs::read_to_string(&path)?;
            let parsed = ParsedFile::parse(path.to_string_lossy().into_owned(), text);
            for specifier in module_specifiers(&parsed.arena) {
                if let Ok(Resolution::File(target)) = resolver.resolve(&specifier, &path) {
                    queue.push_back(target);
                }
            }
            debug!(file = %parsed.file_name, "loaded file");
            self.files.push(parsed);
        }
        Ok(self)
    }

    /// Bind every file and link module specifiers.
    pub fn build(self) -> Program {
        let _span = span!(Level::DEBUG, "build_program", files = self.files.len()).entered();
        let mut binder = BinderState::new();
        let mut files: Vec<SourceFile> = self
            .files
            .into_iter()
            .enumerate()
            .map(|(i, parsed)| SourceFile {
                id: FileId(i as u32),
                file_name: parsed.file_name,
                arena: parsed.arena,
                diagnostics: parsed.diagnostics,
                is_lib: false,
            })
            .collect();

        let mut lib_file = None;
        if self.include_default_lib {
            let LibFile {
                file_name,
                arena,
                diagnostics,
            } = lib_loader::load_default_lib();
            let id = FileId(files.len() as u32);
            binder.bind_lib_file(id, &arena);
            files.push(SourceFile {
                id,
                file_name,
                arena,
                diagnostics,
                is_lib: true,
            });
            lib_file = Some(id);
        }
        let global_this = lib_loader::declare_global_this(&mut binder);

        for file in files.iter().filter(|f| !f.is_lib) {
            binder.bind_source_file(file.id, &file.arena);
        }

        let mut global_names = binder.globals.clone();
        merge_lib_symbols(&mut global_names, &binder.lib_globals);

        let mut program = Program {
            files,
            binder,
            resolved_modules: FxHashMap::default(),
            external_modules: IndexMap::new(),
            external_symbols: FxHashMap::default(),
            global_this,
            lib_file,
            global_names,
            diagnostics: Vec::new(),
        };
        program.link();
        program
    }
}

/// Every file of a bundle, bound, with module specifiers resolved.
pub struct Program {
    pub files: Vec<SourceFile>,
    pub binder: BinderState,
    resolved_modules: FxHashMap<FileId, FxHashMap<String, ModuleTarget>>,
    /// Synthetic module symbols of external specifiers, in first-seen order
    external_modules: IndexMap<String, SymbolId>,
    external_symbols: FxHashMap<SymbolId, ExternalImport>,
    /// Implicit global namespace
    pub global_this: SymbolId,
    lib_file: Option<FileId>,
    /// Program globals over lib globals
    global_names: SymbolTable,
    /// Module resolution diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    // =========================================================================
    // Linking
    // =========================================================================

    fn link(&mut self) {
        let mut resolver = ModuleResolver::in_memory(
            self.files
                .iter()
                .filter(|f| !f.is_lib)
                .map(|f| PathBuf::from(&f.file_name)),
        );
        let file_ids: FxHashMap<PathBuf, FileId> = self
            .files
            .iter()
            .map(|f| (PathBuf::from(&f.file_name), f.id))
            .collect();

        for file in self.files.iter().filter(|f| !f.is_lib) {
            let Some(bindings) = self.binder.file_bindings(file.id) else {
                continue;
            };
            let mut targets = FxHashMap::default();
            for (specifier, literal) in &bindings.module_specifiers {
                if targets.contains_key(specifier) {
                    continue;
                }
                let target = if is_relative_specifier(specifier)
                    || Path::new(specifier).is_absolute()
                {
                    match resolver.resolve(specifier, Path::new(&file.file_name)) {
                        Ok(Resolution::File(path)) => file_ids.get(&path).copied().map(ModuleTarget::File),
                        Ok(Resolution::External) => None,
                        Err(failure) => {
                            let (start, length) = file
                                .arena
                                .get(*literal)
                                .map_or((0, 0), |n| (n.pos, n.end.saturating_sub(n.pos)));
                            self.diagnostics.push(failure.to_diagnostic(start, length));
                            None
                        }
                    }
                } else if let Some(ambient) = self.binder.ambient_modules.get(specifier) {
                    Some(ModuleTarget::Ambient(ambient))
                } else {
                    Some(ModuleTarget::External(specifier.clone()))
                };
                trace!(file = %file.file_name, specifier, ?target, "linked specifier");
                if let Some(target) = target {
                    targets.insert(specifier.clone(), target);
                }
            }
            self.resolved_modules.insert(file.id, targets);
        }

        let externals: Vec<String> = self
            .resolved_modules
            .values()
            .flat_map(|targets| targets.values())
            .filter_map(|target| match target {
                ModuleTarget::External(specifier) => Some(specifier.clone()),
                _ => None,
            })
            .collect();
        // Deterministic order: by file, then specifier position
        let mut ordered = Vec::new();
        for file in self.files.iter().filter(|f| !f.is_lib) {
            if let Some(bindings) = self.binder.file_bindings(file.id) {
                for (specifier, _) in &bindings.module_specifiers {
                    if externals.contains(specifier) && !ordered.contains(specifier) {
                        ordered.push(specifier.clone());
                    }
                }
            }
        }
        for specifier in ordered {
            self.external_module_symbol(&specifier);
        }

        self.declare_external_exports();
        debug!(
            externals = self.external_modules.len(),
            diagnostics = self.diagnostics.len(),
            "linked program"
        );
    }

    fn external_module_symbol(&mut self, specifier: &str) -> SymbolId {
        if let Some(&existing) = self.external_modules.get(specifier) {
            return existing;
        }
        let sym_id = self
            .binder
            .symbols
            .alloc(symbol_flags::VALUE_MODULE, format!("\"{specifier}\""));
        self.external_modules.insert(specifier.to_string(), sym_id);
        self.external_symbols.insert(
            sym_id,
            ExternalImport {
                specifier: specifier.to_string(),
                name: None,
            },
        );
        sym_id
    }

    fn external_export_symbol(&mut self, specifier: &str, name: &str) -> SymbolId {
        let module = self.external_module_symbol(specifier);
        if let Some(existing) = self
            .binder
            .symbols
            .get(module)
            .and_then(|m| m.exports.as_deref())
            .and_then(|exports| exports.get(name))
        {
            return existing;
        }
        let sym_id = self.binder.symbols.alloc(symbol_flags::ALIAS, name.to_string());
        if let Some(sym) = self.binder.symbols.get_mut(sym_id) {
            sym.parent = module;
            sym.is_exported = true;
        }
        if let Some(sym) = self.binder.symbols.get_mut(module) {
            sym.exports_mut().set(name.to_string(), sym_id);
        }
        self.external_symbols.insert(
            sym_id,
            ExternalImport {
                specifier: specifier.to_string(),
                name: Some(name.to_string()),
            },
        );
        sym_id
    }

    /// Create the synthetic export symbol of every name imported from an
    /// external module, by import declarations and by import types.
    fn declare_external_exports(&mut self) {
        let mut requests: Vec<(String, String)> = Vec::new();
        for (_, sym) in self.binder.symbols.iter() {
            let (Some(specifier), Some(name), Some(decl)) = (
                sym.import_module.as_deref(),
                sym.import_name.as_deref(),
                sym.first_declaration(),
            ) else {
                continue;
            };
            if let Some(ModuleTarget::External(spec)) = self.module_target(decl.file, specifier) {
                requests.push((spec.clone(), name.to_string()));
            }
        }

        for file in self.files.iter().filter(|f| !f.is_lib) {
            let arena = &file.arena;
            for (i, node) in arena.nodes.iter().enumerate() {
                if node.kind != IMPORT_TYPE {
                    continue;
                }
                let Some(import_type) = arena.get_import_type(node) else {
                    continue;
                };
                let Some(specifier) = import_type_specifier(arena, import_type.argument) else {
                    continue;
                };
                let Some(ModuleTarget::External(spec)) = self.module_target(file.id, specifier)
                else {
                    continue;
                };
                let leftmost = leftmost_identifier(arena, import_type.qualifier);
                if let Some(name) = arena.identifier_text(leftmost) {
                    requests.push((spec.clone(), name.to_string()));
                }
                trace!(node = i, specifier, "external import type");
            }
        }

        for (specifier, name) in requests {
            self.external_export_symbol(&specifier, &name);
        }
    }

    // =========================================================================
    // Files and nodes
    // =========================================================================

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn arena(&self, id: FileId) -> Option<&NodeArena> {
        self.file(id).map(|f| &f.arena)
    }

    pub fn file_id(&self, file_name: impl AsRef<Path>) -> Option<FileId> {
        let name = normalize_path(file_name.as_ref());
        let name = name.to_string_lossy();
        self.files
            .iter()
            .find(|f| f.file_name == name)
            .map(|f| f.id)
    }

    /// Files that are not the lib.
    pub fn source_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| !f.is_lib)
    }

    pub fn is_lib_file(&self, id: FileId) -> bool {
        self.lib_file == Some(id)
    }

    /// Parse and link diagnostics, in file order.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        self.files
            .iter()
            .filter(|f| !f.is_lib)
            .flat_map(|f| f.diagnostics.iter().cloned())
            .chain(self.diagnostics.iter().cloned())
            .collect()
    }

    pub fn parent_node(&self, node: NodeRef) -> Option<NodeRef> {
        let parent = self.arena(node.file)?.parent_of(node.node);
        parent.is_some().then(|| NodeRef::new(node.file, parent))
    }

    pub fn node_text(&self, node: NodeRef) -> &str {
        self.arena(node.file)
            .map_or("", |arena| arena.node_text(node.node))
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.binder.symbols.get(id)
    }

    pub fn symbol_flags(&self, id: SymbolId) -> u32 {
        self.symbol(id).map_or(0, |s| s.flags)
    }

    /// Module symbol of an external module file.
    pub fn module_symbol(&self, file: FileId) -> Option<SymbolId> {
        let module = self.binder.file_bindings(file)?.module_symbol;
        (!module.is_none()).then_some(module)
    }

    /// File whose module symbol is `module`.
    pub fn module_file(&self, module: SymbolId) -> Option<FileId> {
        let decl = self.symbol(module)?.first_declaration()?;
        (self.module_symbol(decl.file) == Some(module)).then_some(decl.file)
    }

    /// What a module specifier written in `file` resolved to.
    pub fn module_target(&self, file: FileId, specifier: &str) -> Option<&ModuleTarget> {
        self.resolved_modules.get(&file)?.get(specifier)
    }

    /// Program files imported by `file`, in specifier order.
    pub fn module_dependencies(&self, file: FileId) -> Vec<FileId> {
        let Some(bindings) = self.binder.file_bindings(file) else {
            return Vec::new();
        };
        let mut deps = Vec::new();
        for (specifier, _) in &bindings.module_specifiers {
            if let Some(ModuleTarget::File(target)) = self.module_target(file, specifier)
                && !deps.contains(target)
            {
                deps.push(*target);
            }
        }
        deps
    }

    /// Module symbol for a specifier as seen from `file`.
    pub fn resolve_module(&self, file: Option<FileId>, specifier: &str) -> Option<SymbolId> {
        let target = file.and_then(|f| self.module_target(f, specifier));
        match target {
            Some(ModuleTarget::File(target)) => self.module_symbol(*target),
            Some(ModuleTarget::Ambient(sym)) => Some(*sym),
            Some(ModuleTarget::External(spec)) => self.external_modules.get(spec).copied(),
            None if !is_relative_specifier(specifier) => self
                .binder
                .ambient_modules
                .get(specifier)
                .or_else(|| self.external_modules.get(specifier).copied()),
            None => None,
        }
    }

    /// Synthetic external symbol info, `None` for program symbols.
    pub fn external_import(&self, sym_id: SymbolId) -> Option<&ExternalImport> {
        self.external_symbols.get(&sym_id)
    }

    pub fn external_modules(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.external_modules.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn is_global_namespace(&self, sym_id: SymbolId) -> bool {
        sym_id == self.global_this
    }

    /// Symbol declared only by the lib (or the implicit global namespace).
    pub fn is_lib_symbol(&self, sym_id: SymbolId) -> bool {
        if self.is_global_namespace(sym_id) {
            return true;
        }
        let Some(lib) = self.lib_file else {
            return false;
        };
        self.symbol(sym_id).is_some_and(|sym| {
            !sym.declarations.is_empty() && sym.declarations.iter().all(|d| d.file == lib)
        })
    }

    /// Symbol in the global scope: lib, script-file or `declare global`.
    pub fn is_global_symbol(&self, sym_id: SymbolId) -> bool {
        let Some(sym) = self.symbol(sym_id) else {
            return false;
        };
        self.binder.globals.get(&sym.escaped_name) == Some(sym_id)
            || self.binder.lib_globals.get(&sym.escaped_name) == Some(sym_id)
    }

    /// What a name means at global scope.
    pub fn resolve_global_name(&self, name: &str) -> Option<SymbolId> {
        self.global_names.get(name)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Symbol for a declaration, a declaration name or a reference.
    pub fn symbol_at(&self, node: NodeRef) -> Option<SymbolId> {
        if let Some(sym) = self.binder.node_symbol(node) {
            return Some(sym);
        }
        let arena = self.arena(node.file)?;
        let n = arena.get(node.node)?;
        match n.kind {
            k if k == SyntaxKind::Identifier as u16 => {
                let parent = arena.parent_of(node.node);
                let is_right_of_qualified = arena
                    .get(parent)
                    .and_then(|p| arena.get_qualified_name(p))
                    .is_some_and(|qn| qn.right == node.node);
                if is_right_of_qualified {
                    return self.symbol_at(NodeRef::new(node.file, parent));
                }
                if let Some(import_type) = enclosing_import_type(arena, node.node) {
                    let module = self.import_type_module(NodeRef::new(node.file, import_type))?;
                    return self.resolve_import_qualifier(node.file, module, node.node);
                }
                self.resolve_identifier(node)
            }
            QUALIFIED_NAME => {
                if let Some(import_type) = enclosing_import_type(arena, node.node) {
                    let module = self.import_type_module(NodeRef::new(node.file, import_type))?;
                    return self.resolve_import_qualifier(node.file, module, node.node);
                }
                self.resolve_entity_name(node)
            }
            IMPORT_TYPE => self.resolve_import_type(node),
            _ => None,
        }
    }

    /// Resolve an identifier through the scopes enclosing it.
    pub fn resolve_identifier(&self, node: NodeRef) -> Option<SymbolId> {
        let arena = self.arena(node.file)?;
        let name = arena.identifier_text(node.node)?;
        let scope = self
            .binder
            .find_enclosing_scope(node.file, arena, node.node);
        self.binder.lookup_name(scope, name)
    }

    /// Resolve an identifier or qualified name (`A.B.C`) by scope lookup of
    /// the leftmost identifier and export lookups for the rest.
    pub fn resolve_entity_name(&self, node: NodeRef) -> Option<SymbolId> {
        let arena = self.arena(node.file)?;
        let n = arena.get(node.node)?;
        if n.is_identifier() {
            return self.resolve_identifier(node);
        }
        let qualified = arena.get_qualified_name(n)?;
        let left = self.resolve_entity_name(NodeRef::new(node.file, qualified.left))?;
        let right = arena.identifier_text(qualified.right)?;
        self.export_of(self.resolve_alias(left), right)
    }

    /// Resolve `import("m").A.B` to `B`, or `import("m")` to the module.
    pub fn resolve_import_type(&self, node: NodeRef) -> Option<SymbolId> {
        let arena = self.arena(node.file)?;
        let import_type = arena.get_import_type(arena.get(node.node)?)?;
        let module = self.import_type_module(node)?;
        if import_type.qualifier.is_none() {
            return Some(self.export_equals(module).unwrap_or(module));
        }
        self.resolve_import_qualifier(node.file, module, import_type.qualifier)
    }

    /// Module symbol an import type refers to.
    pub fn import_type_module(&self, node: NodeRef) -> Option<SymbolId> {
        let arena = self.arena(node.file)?;
        let import_type = arena.get_import_type(arena.get(node.node)?)?;
        let specifier = import_type_specifier(arena, import_type.argument)?;
        self.resolve_module(Some(node.file), specifier)
    }

    fn resolve_import_qualifier(
        &self,
        file: FileId,
        module: SymbolId,
        name: NodeIndex,
    ) -> Option<SymbolId> {
        let arena = self.arena(file)?;
        let n = arena.get(name)?;
        if n.is_identifier() {
            return self.export_of(module, arena.identifier_text(name)?);
        }
        let qualified = arena.get_qualified_name(n)?;
        let left = self.resolve_import_qualifier(file, module, qualified.left)?;
        self.export_of(self.resolve_alias(left), arena.identifier_text(qualified.right)?)
    }

    /// `export =` symbol of a module.
    pub fn export_equals(&self, module: SymbolId) -> Option<SymbolId> {
        self.symbol(module)?.exports.as_deref()?.get("export=")
    }

    /// Export `name` of a module, namespace or enum, following `export *`
    /// and the members of an `export =` namespace.
    pub fn export_of(&self, container: SymbolId, name: &str) -> Option<SymbolId> {
        let mut visited = FxHashSet::default();
        self.export_of_inner(container, name, &mut visited)
    }

    fn export_of_inner(
        &self,
        container: SymbolId,
        name: &str,
        visited: &mut FxHashSet<SymbolId>,
    ) -> Option<SymbolId> {
        if !visited.insert(container) {
            return None;
        }
        let sym = self.symbol(container)?;
        if let Some(found) = sym.exports.as_deref().and_then(|e| e.get(name)) {
            return Some(found);
        }
        if name != "default" && name != "export=" {
            let file = sym.first_declaration().map(|d| d.file);
            for specifier in &sym.star_exports {
                if let Some(target) = self.resolve_module(file, specifier)
                    && let Some(found) = self.export_of_inner(target, name, visited)
                {
                    return Some(found);
                }
            }
        }
        if name != "export="
            && let Some(equals) = self.export_equals(container)
        {
            let target = self.resolve_alias(equals);
            if target != equals {
                return self.export_of_inner(target, name, visited);
            }
        }
        None
    }

    /// One alias hop: the symbol an import or export alias points at.
    pub fn alias_target(&self, sym_id: SymbolId) -> Option<SymbolId> {
        let sym = self.symbol(sym_id)?;
        if !sym.has_flags(symbol_flags::ALIAS) || self.external_symbols.contains_key(&sym_id) {
            return None;
        }
        if let Some(entity) = sym.alias_entity {
            return self.resolve_entity_name(entity);
        }
        let specifier = sym.import_module.as_deref()?;
        let file = sym.first_declaration().map(|d| d.file);
        let module = self.resolve_module(file, specifier)?;
        match sym.import_name.as_deref() {
            None => Some(self.export_equals(module).unwrap_or(module)),
            Some(name) => self.export_of(module, name).or_else(|| {
                // Default import of an `export =` module
                (name == "default")
                    .then(|| self.export_equals(module))
                    .flatten()
            }),
        }
    }

    /// Follow alias hops to the aliased symbol. Unresolvable aliases resolve
    /// to the last alias reached.
    pub fn resolve_alias(&self, sym_id: SymbolId) -> SymbolId {
        let mut current = sym_id;
        for _ in 0..MAX_ALIAS_CHAIN_DEPTH {
            match self.alias_target(current) {
                Some(next) if next != current => current = next,
                _ => return current,
            }
        }
        warn!(symbol = sym_id.0, "alias chain exceeds depth limit");
        current
    }

    /// Exports of a module file: own exports in declaration order, then names
    /// reached through `export *` (never `default` or `export =`).
    pub fn module_exports(&self, file: FileId) -> Vec<(String, SymbolId)> {
        let Some(module) = self.module_symbol(file) else {
            return Vec::new();
        };
        let mut exports = IndexMap::new();
        let mut visited = FxHashSet::default();
        self.collect_exports(module, true, &mut exports, &mut visited);
        exports.into_iter().collect()
    }

    fn collect_exports(
        &self,
        module: SymbolId,
        is_root: bool,
        out: &mut IndexMap<String, SymbolId>,
        visited: &mut FxHashSet<SymbolId>,
    ) {
        if !visited.insert(module) {
            return;
        }
        let Some(sym) = self.symbol(module) else {
            return;
        };
        if let Some(exports) = sym.exports.as_deref() {
            for (name, &id) in exports.iter() {
                if !is_root && (name == "default" || name == "export=") {
                    continue;
                }
                out.entry(name.clone()).or_insert(id);
            }
        }
        let file = sym.first_declaration().map(|d| d.file);
        for specifier in &sym.star_exports {
            if let Some(target) = self.resolve_module(file, specifier) {
                self.collect_exports(target, false, out, visited);
            }
        }
    }

    /// External specifiers re-exported with `export *` by a module file,
    /// directly or through other program modules.
    pub fn external_star_exports(&self, file: FileId) -> Vec<String> {
        let mut out = Vec::new();
        let mut visited = FxHashSet::default();
        let mut stack: Vec<SymbolId> = self.module_symbol(file).into_iter().collect();
        while let Some(module) = stack.pop() {
            if !visited.insert(module) {
                continue;
            }
            let Some(sym) = self.symbol(module) else {
                continue;
            };
            let decl_file = sym.first_declaration().map(|d| d.file);
            for specifier in &sym.star_exports {
                let Some(target) = self.resolve_module(decl_file, specifier) else {
                    continue;
                };
                match self.external_import(target) {
                    Some(external) => {
                        if !out.contains(&external.specifier) {
                            out.push(external.specifier.clone());
                        }
                    }
                    None => stack.push(target),
                }
            }
        }
        out
    }
}

/// Unwrap `import("m")`'s argument to the specifier text.
fn import_type_specifier(arena: &NodeArena, argument: NodeIndex) -> Option<&str> {
    let node = arena.get(argument)?;
    let literal = if node.kind == LITERAL_TYPE {
        arena.get_wrapped(node)?.inner
    } else {
        argument
    };
    arena.literal_text(literal)
}

/// Leftmost identifier of an entity name.
pub fn leftmost_identifier(arena: &NodeArena, mut name: NodeIndex) -> NodeIndex {
    while let Some(qualified) = arena.get(name).and_then(|n| arena.get_qualified_name(n)) {
        name = qualified.left;
    }
    name
}

/// `IMPORT_TYPE` whose qualifier has `name` as a prefix.
fn enclosing_import_type(arena: &NodeArena, name: NodeIndex) -> Option<NodeIndex> {
    let mut current = name;
    loop {
        let parent = arena.parent_of(current);
        let parent_node = arena.get(parent)?;
        match parent_node.kind {
            QUALIFIED_NAME if arena.get_qualified_name(parent_node)?.left == current => {
                current = parent;
            }
            IMPORT_TYPE if arena.get_import_type(parent_node)?.qualifier == current => {
                return Some(parent);
            }
            _ => return None,
        }
    }
}

/// Module specifiers of a parsed file, before binding.
fn module_specifiers(arena: &NodeArena) -> Vec<String> {
    let mut specifiers = Vec::new();
    for (i, node) in arena.nodes.iter().enumerate() {
        if node.kind != SyntaxKind::StringLiteral as u16 {
            continue;
        }
        let idx = NodeIndex(i as u32);
        let parent = arena.parent_of(idx);
        let is_specifier = match arena.get(parent).map(|p| p.kind) {
            Some(IMPORT_DECLARATION | EXPORT_DECLARATION | EXTERNAL_MODULE_REFERENCE) => true,
            Some(LITERAL_TYPE) => arena
                .get(arena.parent_of(parent))
                .is_some_and(|p| p.kind == IMPORT_TYPE),
            _ => false,
        };
        if is_specifier
            && let Some(text) = arena.literal_text(idx)
            && !specifiers.iter().any(|s| s == text)
        {
            specifiers.push(text.to_string());
        }
    }
    specifiers
}
