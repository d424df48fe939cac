//! Binder state shared by every file of a program.
//!
//! One `BinderState` binds all files so that symbols merged across files
//! (globals, ambient modules) keep a single identity. Per-file data such as
//! node-to-symbol maps and scope ids lives in `FileBindings`.

use crate::scopes::{ContainerKind, Scope, ScopeId};
use crate::symbols::{FileId, NodeRef, SymbolArena, SymbolId, SymbolTable, symbol_flags};
use dtsz_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use dtsz_parser::NodeArena;
use dtsz_parser::NodeIndex;
use rustc_hash::FxHashMap;
use tracing::{Level, debug, span, trace};

/// Binding results for one file.
#[derive(Clone, Debug)]
pub struct FileBindings {
    pub file: FileId,
    /// File has a top-level import or export
    pub is_external_module: bool,
    /// `VALUE_MODULE` symbol of an external module file, `NONE` for scripts
    pub module_symbol: SymbolId,
    pub root_scope: ScopeId,
    /// Declaration nodes and their name nodes to symbols
    pub node_symbols: FxHashMap<u32, SymbolId>,
    /// Scope-creating nodes to their scopes
    pub node_scope_ids: FxHashMap<u32, ScopeId>,
    /// Every module specifier the file mentions, with the literal node
    pub module_specifiers: Vec<(String, NodeIndex)>,
}

impl FileBindings {
    pub fn new(file: FileId) -> FileBindings {
        FileBindings {
            file,
            is_external_module: false,
            module_symbol: SymbolId::NONE,
            root_scope: ScopeId::NONE,
            node_symbols: FxHashMap::default(),
            node_scope_ids: FxHashMap::default(),
            module_specifiers: Vec::new(),
        }
    }
}

/// Binder state for a whole program.
pub struct BinderState {
    /// Arena for symbol storage
    pub symbols: SymbolArena,
    /// Persistent scopes of every file
    pub scopes: Vec<Scope>,
    /// Script-file and `declare global` declarations
    pub globals: SymbolTable,
    /// Declarations of the built-in lib
    pub lib_globals: SymbolTable,
    /// `declare module "m" {}` symbols by specifier
    pub ambient_modules: SymbolTable,
    /// Per-file bindings, indexed by `FileId`
    pub files: Vec<FileBindings>,
    pub(crate) current_file: FileId,
    pub(crate) current_scope_id: ScopeId,
    /// Global declarations go to `lib_globals` while binding the lib
    pub(crate) binding_lib: bool,
}

impl Default for BinderState {
    fn default() -> Self {
        BinderState::new()
    }
}

impl BinderState {
    pub fn new() -> BinderState {
        BinderState {
            symbols: SymbolArena::new(),
            scopes: Vec::new(),
            globals: SymbolTable::new(),
            lib_globals: SymbolTable::new(),
            ambient_modules: SymbolTable::new(),
            files: Vec::new(),
            current_file: FileId(0),
            current_scope_id: ScopeId::NONE,
            binding_lib: false,
        }
    }

    pub fn file_bindings(&self, file: FileId) -> Option<&FileBindings> {
        self.files.get(file.0 as usize)
    }

    pub(crate) fn current_bindings_mut(&mut self) -> &mut FileBindings {
        let file = self.current_file;
        let index = file.0 as usize;
        while self.files.len() <= index {
            let next = FileId(self.files.len() as u32);
            self.files.push(FileBindings::new(next));
        }
        &mut self.files[index]
    }

    /// Symbol recorded for a declaration node or its name.
    pub fn node_symbol(&self, node: NodeRef) -> Option<SymbolId> {
        self.file_bindings(node.file)?
            .node_symbols
            .get(&node.node.0)
            .copied()
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        if id.is_none() {
            None
        } else {
            self.scopes.get(id.0 as usize)
        }
    }

    // =========================================================================
    // Symbol declaration
    // =========================================================================

    /// Declare a symbol in the current scope, merging when allowed.
    pub(crate) fn declare_symbol(
        &mut self,
        name: &str,
        flags: u32,
        declaration: NodeIndex,
        is_exported: bool,
    ) -> SymbolId {
        self.declare_symbol_in(self.current_scope_id, name, flags, declaration, is_exported)
    }

    /// Declare a symbol in a given scope.
    ///
    /// Exported declarations of a namespace or module are looked up in the
    /// container's exports first so that declarations from separate blocks of
    /// a merged namespace end up on one symbol.
    pub(crate) fn declare_symbol_in(
        &mut self,
        scope_id: ScopeId,
        name: &str,
        flags: u32,
        declaration: NodeIndex,
        is_exported: bool,
    ) -> SymbolId {
        let (container, export_all) = self
            .scope(scope_id)
            .map_or((SymbolId::NONE, false), |scope| {
                (scope.container_symbol, scope.export_all)
            });
        let exported = (is_exported || export_all) && !container.is_none();

        let exported_existing = exported
            .then(|| self.export_table(container).and_then(|t| t.get(name)))
            .flatten();
        let existing = exported_existing
            .or_else(|| self.scope_table(scope_id).and_then(|t| t.get(name)));

        let sym_id = self.declare_or_merge(existing, name, flags, declaration, exported);
        if let Some(sym) = self.symbols.get_mut(sym_id)
            && sym.parent.is_none()
        {
            sym.parent = container;
        }

        if let Some(table) = self.scope_table_mut(scope_id) {
            table.set(name.to_string(), sym_id);
        }
        if exported && let Some(sym) = self.symbols.get_mut(container) {
            sym.exports_mut().set(name.to_string(), sym_id);
        }
        self.current_bindings_mut()
            .node_symbols
            .insert(declaration.0, sym_id);
        sym_id
    }

    /// Declare a symbol that only exists in the container's exports, such as
    /// `export { a as b }` or `export default <expression>`.
    pub(crate) fn declare_export(
        &mut self,
        name: &str,
        flags: u32,
        declaration: NodeIndex,
    ) -> SymbolId {
        let container = self
            .scope(self.current_scope_id)
            .map_or(SymbolId::NONE, |scope| scope.container_symbol);
        let existing = self.export_table(container).and_then(|t| t.get(name));
        let sym_id = self.declare_or_merge(existing, name, flags, declaration, true);
        if let Some(sym) = self.symbols.get_mut(sym_id) {
            sym.parent = container;
        }
        if let Some(sym) = self.symbols.get_mut(container) {
            sym.exports_mut().set(name.to_string(), sym_id);
        }
        self.current_bindings_mut()
            .node_symbols
            .insert(declaration.0, sym_id);
        sym_id
    }

    /// Add an existing symbol to the current container's exports under
    /// another name (`export default class Foo {}` exports `Foo` as `default`).
    pub(crate) fn add_export_name(&mut self, name: &str, sym_id: SymbolId) {
        let container = self
            .scope(self.current_scope_id)
            .map_or(SymbolId::NONE, |scope| scope.container_symbol);
        if let Some(sym) = self.symbols.get_mut(container) {
            sym.exports_mut().set(name.to_string(), sym_id);
        }
    }

    fn declare_or_merge(
        &mut self,
        existing: Option<SymbolId>,
        name: &str,
        flags: u32,
        declaration: NodeIndex,
        is_exported: bool,
    ) -> SymbolId {
        let decl = NodeRef::new(self.current_file, declaration);

        if let Some(existing_id) = existing {
            let existing_flags = self.symbols.get(existing_id).map_or(0, |s| s.flags);
            let can_merge = Self::can_merge_flags(existing_flags, flags);
            if let Some(sym) = self.symbols.get_mut(existing_id) {
                if can_merge {
                    sym.flags |= flags;
                }
                sym.add_declaration(decl);
                if is_exported {
                    sym.is_exported = true;
                }
                trace!(
                    name,
                    symbol = existing_id.0,
                    can_merge,
                    declarations = sym.declarations.len(),
                    "merged declaration"
                );
            }
            return existing_id;
        }

        let sym_id = self.symbols.alloc(flags, name.to_string());
        if let Some(sym) = self.symbols.get_mut(sym_id) {
            sym.add_declaration(decl);
            sym.is_exported = is_exported;
        }
        trace!(name, symbol = sym_id.0, flags, "declared symbol");
        sym_id
    }

    /// Check if two symbol flag sets can be merged.
    pub fn can_merge_flags(existing_flags: u32, new_flags: u32) -> bool {
        if (existing_flags & symbol_flags::INTERFACE) != 0
            && (new_flags & symbol_flags::INTERFACE) != 0
        {
            return true;
        }

        if (existing_flags & symbol_flags::CLASS != 0 && (new_flags & symbol_flags::INTERFACE) != 0)
            || (existing_flags & symbol_flags::INTERFACE != 0
                && (new_flags & symbol_flags::CLASS) != 0)
        {
            return true;
        }

        if (existing_flags & symbol_flags::MODULE) != 0 && (new_flags & symbol_flags::MODULE) != 0 {
            return true;
        }

        if (existing_flags & symbol_flags::MODULE) != 0
            && (new_flags & (symbol_flags::CLASS | symbol_flags::FUNCTION | symbol_flags::ENUM))
                != 0
        {
            return true;
        }
        if (new_flags & symbol_flags::MODULE) != 0
            && (existing_flags
                & (symbol_flags::CLASS | symbol_flags::FUNCTION | symbol_flags::ENUM))
                != 0
        {
            return true;
        }

        // Enum declarations of one name merge; const and regular must agree
        if (existing_flags & symbol_flags::ENUM) != 0
            && (existing_flags & symbol_flags::ENUM) == (new_flags & symbol_flags::ENUM)
        {
            return true;
        }

        // Function overloads
        if (existing_flags & symbol_flags::FUNCTION) != 0
            && (new_flags & symbol_flags::FUNCTION) != 0
        {
            return true;
        }

        // `declare var x` may be redeclared
        if (existing_flags & symbol_flags::FUNCTION_SCOPED_VARIABLE) != 0
            && (new_flags & symbol_flags::FUNCTION_SCOPED_VARIABLE) != 0
        {
            return true;
        }

        // `interface Object` + `declare var Object`
        if (existing_flags & symbol_flags::INTERFACE) != 0 && (new_flags & symbol_flags::VALUE) != 0
        {
            return true;
        }
        if (new_flags & symbol_flags::INTERFACE) != 0 && (existing_flags & symbol_flags::VALUE) != 0
        {
            return true;
        }

        // Type aliases and values live in separate declaration spaces
        if (existing_flags & symbol_flags::TYPE_ALIAS) != 0
            && (new_flags & symbol_flags::VALUE) != 0
        {
            return true;
        }
        if (new_flags & symbol_flags::TYPE_ALIAS) != 0
            && (existing_flags & symbol_flags::VALUE) != 0
        {
            return true;
        }

        false
    }

    // =========================================================================
    // Scope management
    // =========================================================================

    pub(crate) fn enter_scope(&mut self, kind: ContainerKind, node: NodeIndex) -> ScopeId {
        let new_scope_id = ScopeId(self.scopes.len() as u32);
        self.scopes
            .push(Scope::new(self.current_scope_id, kind, node));
        if node.is_some() {
            self.current_bindings_mut()
                .node_scope_ids
                .insert(node.0, new_scope_id);
        }
        self.current_scope_id = new_scope_id;
        new_scope_id
    }

    pub(crate) fn exit_scope(&mut self) {
        if let Some(scope) = self.scope(self.current_scope_id) {
            self.current_scope_id = scope.parent;
        }
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        if id.is_none() {
            None
        } else {
            self.scopes.get_mut(id.0 as usize)
        }
    }

    fn globals_table_mut(&mut self) -> &mut SymbolTable {
        if self.binding_lib {
            &mut self.lib_globals
        } else {
            &mut self.globals
        }
    }

    fn scope_table(&self, id: ScopeId) -> Option<&SymbolTable> {
        let scope = self.scope(id)?;
        if scope.is_global {
            Some(if self.binding_lib {
                &self.lib_globals
            } else {
                &self.globals
            })
        } else {
            Some(&scope.table)
        }
    }

    fn scope_table_mut(&mut self, id: ScopeId) -> Option<&mut SymbolTable> {
        let is_global = self.scope(id)?.is_global;
        if is_global {
            Some(self.globals_table_mut())
        } else {
            self.scope_mut(id).map(|scope| &mut scope.table)
        }
    }

    fn export_table(&self, container: SymbolId) -> Option<&SymbolTable> {
        self.symbols.get(container)?.exports.as_deref()
    }

    /// Find the enclosing scope for a node by walking up the AST.
    /// Falls back to the file's root scope.
    pub fn find_enclosing_scope(
        &self,
        file: FileId,
        arena: &NodeArena,
        node_idx: NodeIndex,
    ) -> ScopeId {
        let Some(bindings) = self.file_bindings(file) else {
            return ScopeId::NONE;
        };
        let mut current = node_idx;
        let mut iterations = 0;
        while current.is_some() && iterations < MAX_SCOPE_WALK_ITERATIONS {
            if let Some(&scope_id) = bindings.node_scope_ids.get(&current.0) {
                return scope_id;
            }
            current = arena.parent_of(current);
            iterations += 1;
        }
        bindings.root_scope
    }

    /// Look a name up starting at `start` and walking outwards, then the
    /// program globals, then the lib.
    pub fn lookup_name(&self, start: ScopeId, name: &str) -> Option<SymbolId> {
        let _span = span!(Level::TRACE, "lookup_name", name).entered();
        let mut scope_id = start;
        let mut depth = 0;
        while let Some(scope) = self.scope(scope_id) {
            if depth >= MAX_SCOPE_WALK_ITERATIONS {
                break;
            }
            if !scope.is_global
                && let Some(sym_id) = scope.table.get(name)
            {
                trace!(depth, symbol = sym_id.0, "found in scope");
                return Some(sym_id);
            }
            // Members exported from other blocks of a merged namespace
            if scope.kind == ContainerKind::Module
                && let Some(sym_id) = self
                    .export_table(scope.container_symbol)
                    .and_then(|t| t.get(name))
            {
                trace!(depth, symbol = sym_id.0, "found in namespace exports");
                return Some(sym_id);
            }
            scope_id = scope.parent;
            depth += 1;
        }

        if let Some(sym_id) = self.globals.get(name) {
            trace!(symbol = sym_id.0, "found in globals");
            return Some(sym_id);
        }
        if let Some(sym_id) = self.lib_globals.get(name) {
            trace!(symbol = sym_id.0, "found in lib");
            return Some(sym_id);
        }
        debug!(name, "name not found in any scope");
        None
    }
}
