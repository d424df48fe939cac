//! Declaration binding: walks a file and declares symbols and scopes.

use crate::scopes::{ContainerKind, ScopeId};
use crate::state::BinderState;
use crate::symbols::{FileId, NodeRef, SymbolId, symbol_flags};
use dtsz_parser::{Node, NodeArena};
use dtsz_parser::syntax_kind_ext::*;
use dtsz_parser::{NodeIndex, NodeList, modifier_flags, node_flags};
use dtsz_scanner::SyntaxKind;
use tracing::{Level, debug, span};

impl BinderState {
    /// Bind one parsed file of the program.
    pub fn bind_source_file(&mut self, file: FileId, arena: &NodeArena) {
        let root = arena.source_file_index();
        let Some(source) = arena.source_file() else {
            return;
        };
        let _span = span!(Level::DEBUG, "bind_source_file", file = %source.file_name).entered();

        self.current_file = file;
        self.current_scope_id = ScopeId::NONE;
        self.current_bindings_mut();

        let is_module = Self::is_external_module(arena, &source.statements);
        let scope_id = self.enter_scope(ContainerKind::SourceFile, root);
        let mut module_symbol = SymbolId::NONE;
        if is_module {
            module_symbol = self
                .symbols
                .alloc(symbol_flags::VALUE_MODULE, format!("\"{}\"", source.file_name));
            if let Some(sym) = self.symbols.get_mut(module_symbol) {
                sym.add_declaration(NodeRef::new(file, root));
            }
            self.current_bindings_mut()
                .node_symbols
                .insert(root.0, module_symbol);
        }
        if let Some(scope) = self.scope_mut(scope_id) {
            scope.container_symbol = module_symbol;
            scope.is_global = !is_module;
        }
        {
            let bindings = self.current_bindings_mut();
            bindings.is_external_module = is_module;
            bindings.module_symbol = module_symbol;
            bindings.root_scope = scope_id;
        }
        debug!(is_module, statements = source.statements.len(), "binding file");

        for &stmt in &source.statements.nodes {
            self.bind_node(arena, stmt);
        }
        self.exit_scope();
    }

    /// Bind the built-in lib; its global declarations go to `lib_globals`.
    pub fn bind_lib_file(&mut self, file: FileId, arena: &NodeArena) {
        self.binding_lib = true;
        self.bind_source_file(file, arena);
        self.binding_lib = false;
    }

    /// A file is a module when any top-level statement imports or exports.
    pub(crate) fn is_external_module(arena: &NodeArena, statements: &NodeList) -> bool {
        statements.iter().any(|stmt| {
            let Some(node) = arena.get(stmt) else {
                return false;
            };
            match node.kind {
                IMPORT_DECLARATION | EXPORT_DECLARATION | EXPORT_ASSIGNMENT => true,
                IMPORT_EQUALS_DECLARATION => {
                    arena.has_modifier(stmt, modifier_flags::EXPORT)
                        || arena
                            .get_import_equals(node)
                            .and_then(|ie| arena.get(ie.module_reference))
                            .is_some_and(|r| r.kind == EXTERNAL_MODULE_REFERENCE)
                }
                _ => arena.has_modifier(stmt, modifier_flags::EXPORT),
            }
        })
    }

    pub(crate) fn bind_node(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        match node.kind {
            VARIABLE_STATEMENT => self.bind_variable_statement(arena, node, idx),
            FUNCTION_DECLARATION => {
                self.bind_named_declaration(arena, idx, symbol_flags::FUNCTION);
                self.bind_container(arena, idx, ContainerKind::Function);
            }
            CLASS_DECLARATION => {
                self.bind_named_declaration(arena, idx, symbol_flags::CLASS);
                self.bind_container(arena, idx, ContainerKind::Type);
            }
            INTERFACE_DECLARATION => {
                self.bind_named_declaration(arena, idx, symbol_flags::INTERFACE);
                self.bind_container(arena, idx, ContainerKind::Type);
            }
            TYPE_ALIAS_DECLARATION => {
                self.bind_named_declaration(arena, idx, symbol_flags::TYPE_ALIAS);
                self.bind_container(arena, idx, ContainerKind::Type);
            }
            ENUM_DECLARATION => self.bind_enum_declaration(arena, node, idx),
            MODULE_DECLARATION => self.bind_module_declaration(arena, node, idx),
            IMPORT_DECLARATION => self.bind_import_declaration(arena, node, idx),
            IMPORT_EQUALS_DECLARATION => self.bind_import_equals_declaration(arena, node, idx),
            EXPORT_DECLARATION => self.bind_export_declaration(arena, node, idx),
            EXPORT_ASSIGNMENT => self.bind_export_assignment(arena, node, idx),
            TYPE_PARAMETER => {
                if let Some(name) = arena.identifier_text(arena.declaration_name(idx)) {
                    self.declare_symbol(name, symbol_flags::TYPE_PARAMETER, idx, false);
                }
                self.bind_children(arena, idx);
            }
            PARAMETER => {
                let name = arena.declaration_name(idx);
                self.declare_binding_name(
                    arena,
                    name,
                    idx,
                    symbol_flags::FUNCTION_SCOPED_VARIABLE,
                    false,
                );
                self.bind_children(arena, idx);
            }
            INFER_TYPE => self.bind_infer_type(arena, node),
            FUNCTION_TYPE | CONSTRUCTOR_TYPE | METHOD_SIGNATURE | METHOD_DECLARATION
            | CONSTRUCTOR | GET_ACCESSOR | SET_ACCESSOR | CALL_SIGNATURE | CONSTRUCT_SIGNATURE
            | INDEX_SIGNATURE => self.bind_container(arena, idx, ContainerKind::Function),
            MAPPED_TYPE | CONDITIONAL_TYPE => {
                self.bind_container(arena, idx, ContainerKind::TypeLevel)
            }
            IMPORT_TYPE => {
                if let Some(import_type) = arena.get_import_type(node) {
                    self.record_module_specifier(arena, import_type.argument);
                }
                self.bind_children(arena, idx);
            }
            _ => self.bind_children(arena, idx),
        }
    }

    pub(crate) fn bind_children(&mut self, arena: &NodeArena, idx: NodeIndex) {
        arena.for_each_child(idx, &mut |child| self.bind_node(arena, child));
    }

    fn bind_container(&mut self, arena: &NodeArena, idx: NodeIndex, kind: ContainerKind) {
        self.enter_scope(kind, idx);
        self.bind_children(arena, idx);
        self.exit_scope();
    }

    /// Declare a function, class, interface or type alias, handling
    /// `export default` and anonymous default declarations.
    fn bind_named_declaration(&mut self, arena: &NodeArena, idx: NodeIndex, flags: u32) {
        let is_export = arena.has_modifier(idx, modifier_flags::EXPORT);
        let is_default = is_export && arena.has_modifier(idx, modifier_flags::DEFAULT);
        let name_idx = arena.declaration_name(idx);

        match arena.identifier_text(name_idx) {
            Some(name) => {
                let sym_id = self.declare_symbol(name, flags, idx, is_export && !is_default);
                self.current_bindings_mut()
                    .node_symbols
                    .insert(name_idx.0, sym_id);
                if is_default {
                    self.add_export_name("default", sym_id);
                }
            }
            None if is_default => {
                self.declare_export("default", flags, idx);
            }
            None => {}
        }
    }

    fn bind_variable_statement(&mut self, arena: &NodeArena, node: &Node, idx: NodeIndex) {
        let Some(var) = arena.get_variable(node) else {
            return;
        };
        let flags = if node.flags & node_flags::BLOCK_SCOPED != 0 {
            symbol_flags::BLOCK_SCOPED_VARIABLE
        } else {
            symbol_flags::FUNCTION_SCOPED_VARIABLE
        };
        let is_exported = arena.has_modifier(idx, modifier_flags::EXPORT);
        for &decl_idx in &var.declarations.nodes {
            let name = arena.declaration_name(decl_idx);
            self.declare_binding_name(arena, name, decl_idx, flags, is_exported);
        }
        self.bind_children(arena, idx);
    }

    /// Declare an identifier or every name inside a binding pattern.
    fn declare_binding_name(
        &mut self,
        arena: &NodeArena,
        name: NodeIndex,
        declaration: NodeIndex,
        flags: u32,
        is_exported: bool,
    ) {
        let Some(name_node) = arena.get(name) else {
            return;
        };
        if let Some(text) = arena.identifier_text(name) {
            let sym_id = self.declare_symbol(text, flags, declaration, is_exported);
            self.current_bindings_mut()
                .node_symbols
                .insert(name.0, sym_id);
            return;
        }
        if let Some(pattern) = arena.get_binding_pattern(name_node) {
            for &element in &pattern.elements.nodes {
                let element_name = arena.declaration_name(element);
                self.declare_binding_name(arena, element_name, element, flags, is_exported);
            }
        }
    }

    fn bind_enum_declaration(&mut self, arena: &NodeArena, node: &Node, idx: NodeIndex) {
        let Some(enum_decl) = arena.get_enum(node) else {
            return;
        };
        let flags = if arena.has_modifier(idx, modifier_flags::CONST) {
            symbol_flags::CONST_ENUM
        } else {
            symbol_flags::REGULAR_ENUM
        };
        let Some(name) = arena.identifier_text(enum_decl.name) else {
            return;
        };
        let is_exported = arena.has_modifier(idx, modifier_flags::EXPORT);
        let enum_sym = self.declare_symbol(name, flags, idx, is_exported);
        self.current_bindings_mut()
            .node_symbols
            .insert(enum_decl.name.0, enum_sym);

        for &member_idx in &enum_decl.members.nodes {
            let Some(member_name) = arena.name_text(arena.declaration_name(member_idx)) else {
                continue;
            };
            let existing = self
                .symbols
                .get(enum_sym)
                .and_then(|sym| sym.exports.as_deref())
                .and_then(|exports| exports.get(member_name));
            let member_sym = existing.unwrap_or_else(|| {
                self.symbols
                    .alloc(symbol_flags::ENUM_MEMBER, member_name.to_string())
            });
            let decl = NodeRef::new(self.current_file, member_idx);
            if let Some(sym) = self.symbols.get_mut(member_sym) {
                sym.parent = enum_sym;
                sym.add_declaration(decl);
            }
            if let Some(sym) = self.symbols.get_mut(enum_sym) {
                sym.exports_mut().set(member_name.to_string(), member_sym);
            }
            self.current_bindings_mut()
                .node_symbols
                .insert(member_idx.0, member_sym);
        }
    }

    fn bind_module_declaration(&mut self, arena: &NodeArena, node: &Node, idx: NodeIndex) {
        let Some(module) = arena.get_module(node) else {
            return;
        };

        if node.flags & node_flags::GLOBAL_AUGMENTATION != 0 {
            let scope_id = self.enter_scope(ContainerKind::Global, idx);
            if let Some(scope) = self.scope_mut(scope_id) {
                scope.is_global = true;
            }
            self.bind_children(arena, idx);
            self.exit_scope();
            return;
        }

        let export_all = arena.has_modifier(idx, modifier_flags::AMBIENT)
            && !Self::has_explicit_exports(arena, module.body);

        let Some(name_node) = arena.get(module.name) else {
            return;
        };
        if name_node.is_string_literal() {
            let Some(specifier) = arena.literal_text(module.name) else {
                return;
            };
            let sym_id = self.declare_ambient_module(specifier, idx);
            self.current_bindings_mut()
                .node_symbols
                .insert(module.name.0, sym_id);
            let scope_id = self.enter_scope(ContainerKind::ExternalModule, idx);
            if let Some(scope) = self.scope_mut(scope_id) {
                scope.container_symbol = sym_id;
                scope.export_all = export_all;
            }
            self.bind_children(arena, idx);
            self.exit_scope();
            return;
        }

        let Some(name) = arena.identifier_text(module.name) else {
            return;
        };
        let mut flags = symbol_flags::NAMESPACE_MODULE;
        if Self::is_instantiated_module(arena, idx) {
            flags |= symbol_flags::VALUE_MODULE;
        }
        let is_exported = node.flags & node_flags::NESTED_NAMESPACE != 0
            || arena.has_modifier(idx, modifier_flags::EXPORT);
        let sym_id = self.declare_symbol(name, flags, idx, is_exported);
        self.current_bindings_mut()
            .node_symbols
            .insert(module.name.0, sym_id);

        let scope_id = self.enter_scope(ContainerKind::Module, idx);
        if let Some(scope) = self.scope_mut(scope_id) {
            scope.container_symbol = sym_id;
            scope.export_all = export_all;
        }
        self.bind_children(arena, idx);
        self.exit_scope();
    }

    /// `declare module "m"` symbols merge across every file of the program.
    fn declare_ambient_module(&mut self, specifier: &str, declaration: NodeIndex) -> SymbolId {
        let decl = NodeRef::new(self.current_file, declaration);
        let sym_id = match self.ambient_modules.get(specifier) {
            Some(existing) => existing,
            None => {
                let sym_id = self
                    .symbols
                    .alloc(symbol_flags::VALUE_MODULE, format!("\"{specifier}\""));
                self.ambient_modules.set(specifier.to_string(), sym_id);
                sym_id
            }
        };
        if let Some(sym) = self.symbols.get_mut(sym_id) {
            sym.add_declaration(decl);
        }
        self.current_bindings_mut()
            .node_symbols
            .insert(declaration.0, sym_id);
        sym_id
    }

    /// True when a module body has an `export` modifier or export statement.
    fn has_explicit_exports(arena: &NodeArena, body: NodeIndex) -> bool {
        let Some(statements) = arena.statements_of(body) else {
            return false;
        };
        statements.iter().any(|stmt| {
            arena.has_modifier(stmt, modifier_flags::EXPORT)
                || arena
                    .get(stmt)
                    .is_some_and(|n| n.kind == EXPORT_DECLARATION || n.kind == EXPORT_ASSIGNMENT)
        })
    }

    /// A namespace is instantiated when it declares any value.
    fn is_instantiated_module(arena: &NodeArena, module_idx: NodeIndex) -> bool {
        let Some(node) = arena.get(module_idx) else {
            return false;
        };
        let Some(module) = arena.get_module(node) else {
            return false;
        };
        let Some(body) = arena.get(module.body) else {
            return false;
        };
        if body.kind == MODULE_DECLARATION {
            return Self::is_instantiated_module(arena, module.body);
        }
        let Some(statements) = arena.statements_of(module.body) else {
            return false;
        };
        statements.iter().any(|stmt| match arena.get(stmt).map(|n| n.kind) {
            Some(VARIABLE_STATEMENT | FUNCTION_DECLARATION | CLASS_DECLARATION) => true,
            Some(ENUM_DECLARATION) => !arena.has_modifier(stmt, modifier_flags::CONST),
            Some(MODULE_DECLARATION) => Self::is_instantiated_module(arena, stmt),
            Some(IMPORT_EQUALS_DECLARATION | EXPORT_ASSIGNMENT) => true,
            _ => false,
        })
    }

    /// `infer U` declares `U` in the nearest enclosing conditional type.
    fn bind_infer_type(&mut self, arena: &NodeArena, node: &Node) {
        let type_param = arena.get_wrapped(node).map_or(NodeIndex::NONE, |w| w.inner);
        let mut scope_id = self.current_scope_id;
        while let Some(scope) = self.scope(scope_id) {
            let is_conditional = arena
                .get(scope.container_node)
                .is_some_and(|n| n.kind == CONDITIONAL_TYPE);
            if is_conditional {
                break;
            }
            scope_id = scope.parent;
        }
        if let Some(name) = arena.identifier_text(arena.declaration_name(type_param))
            && self.scope(scope_id).is_some()
        {
            self.declare_symbol_in(
                scope_id,
                name,
                symbol_flags::TYPE_PARAMETER,
                type_param,
                false,
            );
        }
        if let Some(constraint) = arena
            .get(type_param)
            .and_then(|n| arena.get_type_parameter(n))
            .map(|tp| tp.constraint)
        {
            self.bind_node(arena, constraint);
        }
    }

    /// Record a module specifier literal (possibly wrapped in a literal type).
    pub(crate) fn record_module_specifier(&mut self, arena: &NodeArena, specifier: NodeIndex) {
        let literal = match arena.get(specifier) {
            Some(node) if node.kind == LITERAL_TYPE => {
                arena.get_wrapped(node).map_or(NodeIndex::NONE, |w| w.inner)
            }
            Some(node) if node.kind == EXTERNAL_MODULE_REFERENCE => {
                arena.get_wrapped(node).map_or(NodeIndex::NONE, |w| w.inner)
            }
            Some(_) => specifier,
            None => return,
        };
        let is_string = arena
            .get(literal)
            .is_some_and(|n| n.kind == SyntaxKind::StringLiteral as u16);
        if !is_string {
            return;
        }
        if let Some(text) = arena.literal_text(literal) {
            let text = text.to_string();
            self.current_bindings_mut()
                .module_specifiers
                .push((text, literal));
        }
    }
}
